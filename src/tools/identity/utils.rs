use url::Url;

/// Read the token from a proper query parameter.
pub(super) fn token_from_query(url: &str, marker: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == marker)
        .map(|(_, v)| v.trim().to_string())
}

/// Scan the decoded URL text for `marker=`; catches tokens nested inside
/// redirect wrappers where the product URL is itself percent-encoded.
pub(super) fn token_from_raw(url: &str, marker: &str) -> Option<String> {
    let decoded = percent_decode(url);
    let needle = format!("{marker}=");
    let start = decoded.find(&needle)? + needle.len();
    let rest = &decoded[start..];
    let end = rest
        .find(|c: char| matches!(c, '&' | '#' | '?' | '/'))
        .unwrap_or(rest.len());
    Some(rest[..end].trim().to_string())
}

pub(super) fn is_well_formed(token: &str, token_len: usize) -> bool {
    token.len() == token_len && token.chars().all(|c| c.is_ascii_alphanumeric())
}

fn percent_decode(input: &str) -> String {
    url::form_urlencoded::parse(input.as_bytes())
        .map(|(k, v)| {
            if v.is_empty() {
                k.into_owned()
            } else {
                format!("{k}={v}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}
