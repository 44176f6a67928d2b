use crate::types::{Field, FieldValue};
use serde::{Deserialize, Serialize};

/// Post-processing applied to a strategy's raw text, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op", content = "arg")]
pub enum Transform {
    Trim,
    /// Replace every newline with the given separator.
    ReplaceNewlines(String),
    /// Keep only the n-th line (zero-based); missing line fails the strategy.
    Line(usize),
    /// Keep only the n-th space-separated word (zero-based).
    Word(usize),
    /// Drop currency symbols and thousands separators.
    StripCurrency,
    CollapseWhitespace,
}

/// One independent way of locating a field on a detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Strategy {
    /// Rendered text of the first node matching `selector`.
    Text {
        selector: String,
        #[serde(default)]
        transforms: Vec<Transform>,
    },
    /// An attribute of the first node matching `selector`.
    Attribute {
        selector: String,
        attribute: String,
        #[serde(default)]
        transforms: Vec<Transform>,
    },
    /// Text of `target` inside the first `item` of `container`.
    Scoped {
        container: String,
        item: String,
        target: String,
        #[serde(default)]
        transforms: Vec<Transform>,
    },
}

impl Strategy {
    pub fn text(selector: &str) -> Self {
        Strategy::Text {
            selector: selector.into(),
            transforms: vec![],
        }
    }

    pub fn attribute(selector: &str, attribute: &str) -> Self {
        Strategy::Attribute {
            selector: selector.into(),
            attribute: attribute.into(),
            transforms: vec![],
        }
    }

    pub fn scoped(container: &str, item: &str, target: &str) -> Self {
        Strategy::Scoped {
            container: container.into(),
            item: item.into(),
            target: target.into(),
            transforms: vec![],
        }
    }

    pub fn then(mut self, transform: Transform) -> Self {
        match &mut self {
            Strategy::Text { transforms, .. }
            | Strategy::Attribute { transforms, .. }
            | Strategy::Scoped { transforms, .. } => transforms.push(transform),
        }
        self
    }

    pub fn transforms(&self) -> &[Transform] {
        match self {
            Strategy::Text { transforms, .. }
            | Strategy::Attribute { transforms, .. }
            | Strategy::Scoped { transforms, .. } => transforms,
        }
    }

    pub fn selectors(&self) -> Vec<&str> {
        match self {
            Strategy::Text { selector, .. } | Strategy::Attribute { selector, .. } => {
                vec![selector.as_str()]
            }
            Strategy::Scoped {
                container,
                item,
                target,
                ..
            } => vec![container.as_str(), item.as_str(), target.as_str()],
        }
    }
}

/// Ordered strategies for one logical field. First success wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: Field,
    pub strategies: Vec<Strategy>,
}

impl FieldSpec {
    pub fn new(field: Field, strategies: Vec<Strategy>) -> Self {
        Self { field, strategies }
    }
}

/// Declarative extraction table for a whole detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FieldTable(pub Vec<FieldSpec>);

impl FieldTable {
    pub fn spec(&self, field: Field) -> Option<&FieldSpec> {
        self.0.iter().find(|s| s.field == field)
    }
}

/// Outcome of resolving one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub value: FieldValue,
    /// Index of the strategy that produced `value`; `None` on a miss.
    pub strategy: Option<usize>,
}

/// Record of a field for which every strategy failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMiss {
    pub field: Field,
    pub source_url: String,
    /// Zero when the page itself never loaded.
    pub strategies_tried: usize,
}
