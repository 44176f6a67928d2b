use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where listing links and the "next" control live on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Product grid holding the candidate items.
    pub container: String,
    /// One product tile inside `container`.
    pub item: String,
    /// Link inside an item; its `href` is the candidate URL.
    pub link: String,
    /// The "next page" control.
    pub next: String,
    /// Maximum listing pages visited per run.
    pub page_budget: u32,
    /// Bound for a single interactability wait.
    pub wait_ms: u64,
    /// Scroll-and-wait retries before a present control counts as absent.
    pub scroll_retries: u32,
}

impl PaginationConfig {
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}

/// Why traversal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No "next" control on the last page.
    NoNextControl,
    /// The control was present but never became interactable.
    Stalled,
    BudgetReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    /// On listing page `page` (1-based), links not yet collected.
    OnListingPage { page: u32 },
    Exhausted(StopReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOutcome {
    /// Candidate detail URLs in listing order, later pages appended.
    pub links: Vec<String>,
    pub pages_visited: u32,
    pub stop: StopReason,
}
