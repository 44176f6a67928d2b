use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Written in place of a token that could not be read from a URL.
/// Contains `_`, so it can never collide with an alphanumeric token.
pub const INVALID_EXTERNAL_ID: &str = "INVALID_ID";

/// Stable cross-run product key derived from a detail URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExternalId {
    Valid(String),
    /// The URL did not carry a well-formed token.
    Malformed,
}

impl ExternalId {
    pub fn is_malformed(&self) -> bool {
        matches!(self, ExternalId::Malformed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExternalId::Valid(token) => token,
            ExternalId::Malformed => INVALID_EXTERNAL_ID,
        }
    }
}

impl From<String> for ExternalId {
    fn from(s: String) -> Self {
        if s == INVALID_EXTERNAL_ID {
            ExternalId::Malformed
        } else {
            ExternalId::Valid(s)
        }
    }
}

impl From<ExternalId> for String {
    fn from(id: ExternalId) -> Self {
        id.as_str().to_string()
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Random per-observation token; unrelated to product identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn generate() -> Self {
        EventId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Where the product token sits inside a detail URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityScheme {
    /// Query key preceding the token, e.g. `pd_rd_i`.
    pub marker: String,
    /// Exact token width; anything else is treated as malformed.
    pub token_len: usize,
}

impl Default for IdentityScheme {
    fn default() -> Self {
        Self {
            marker: "pd_rd_i".into(),
            token_len: 10,
        }
    }
}
