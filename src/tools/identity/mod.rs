//! Identity Tools

mod tests;
pub mod types;
mod utils;

pub use types::*;
use utils::*;

/// Derive the external product key from a detail-page URL.
///
/// Never fails: a URL without a well-formed token yields
/// [`ExternalId::Malformed`], which dedup always lets through.
pub fn external_id(url: &str, scheme: &IdentityScheme) -> ExternalId {
    let token = token_from_query(url, &scheme.marker).or_else(|| token_from_raw(url, &scheme.marker));

    match token {
        Some(token) if is_well_formed(&token, scheme.token_len) => ExternalId::Valid(token),
        Some(token) => {
            tracing::warn!(%url, %token, expected_len = scheme.token_len, "malformed product token");
            ExternalId::Malformed
        }
        None => {
            tracing::warn!(%url, marker = %scheme.marker, "product token marker not found");
            ExternalId::Malformed
        }
    }
}

/// Fresh token for one scrape event.
pub fn event_id() -> EventId {
    EventId::generate()
}
