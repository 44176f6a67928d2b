use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarvestError>;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// The browsing context can no longer serve pages. Fatal to a run.
    #[error("page unavailable: {url} ({reason})")]
    PageUnavailable { url: String, reason: String },

    /// One page could not be served (bad status, unknown URL, dead link).
    /// The context is still usable.
    #[error("page failed: {url} ({reason})")]
    PageFailed { url: String, reason: String },

    #[error("storage error during {operation}: {message}")]
    Storage { operation: String, message: String },

    #[error("invalid policy: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl HarvestError {
    pub fn storage_error(operation: impl Into<String>, message: impl Into<String>) -> Self {
        HarvestError::Storage {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn page_failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        HarvestError::PageFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Failures that concern a single page rather than the whole context.
    pub fn is_page_failure(&self) -> bool {
        matches!(
            self,
            HarvestError::PageFailed { .. } | HarvestError::InvalidUrl(_)
        )
    }

    pub fn page_unavailable(url: impl Into<String>, reason: impl Into<String>) -> Self {
        HarvestError::PageUnavailable {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
