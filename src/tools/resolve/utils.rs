use super::types::{Strategy, Transform};
use crate::types::MISSING;
use crate::tools::page::PageAccessor;
use once_cell::sync::Lazy;
use regex::Regex;

static CURRENCY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[£$€¥₹,]|\b(?:GBP|USD|EUR)\b").expect("valid regex"));
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Raw text a strategy locates, before transforms. `None` means not found.
pub(super) fn locate<A: PageAccessor + ?Sized>(accessor: &A, strategy: &Strategy) -> Option<String> {
    match strategy {
        Strategy::Text { selector, .. } => {
            let node = accessor.find(selector)?;
            accessor.text(node)
        }
        Strategy::Attribute {
            selector,
            attribute,
            ..
        } => {
            let node = accessor.find(selector)?;
            accessor.attribute(node, attribute)
        }
        Strategy::Scoped {
            container,
            item,
            target,
            ..
        } => {
            let first = accessor.find_all(container, item).into_iter().next()?;
            let node = accessor.find_within(first, target)?;
            accessor.text(node)
        }
    }
}

/// Apply transforms in order. An empty result, or one that reads exactly
/// like the missing sentinel, fails the strategy.
pub(super) fn normalize(raw: String, transforms: &[Transform]) -> Option<String> {
    let mut value = raw;
    for t in transforms {
        value = match t {
            Transform::Trim => value.trim().to_string(),
            Transform::ReplaceNewlines(sep) => value.replace("\r\n", "\n").replace('\n', sep),
            Transform::Line(i) => value.lines().nth(*i)?.to_string(),
            Transform::Word(i) => value.split(' ').filter(|w| !w.is_empty()).nth(*i)?.to_string(),
            Transform::StripCurrency => CURRENCY_REGEX.replace_all(&value, "").trim().to_string(),
            Transform::CollapseWhitespace => {
                WHITESPACE_REGEX.replace_all(value.trim(), " ").into_owned()
            }
        };
    }
    let value = value.trim().to_string();
    (!value.is_empty() && value != MISSING).then_some(value)
}
