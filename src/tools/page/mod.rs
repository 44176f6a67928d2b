//! Page Access
//!
//! One browsing context: a current document plus navigation. Everything the
//! harvester reads from a page goes through [`PageAccessor`], so callers can
//! swap a rendering backend without touching the extraction logic.

mod document;
mod fetch;
mod session;
mod tests;

pub use document::HtmlDocument;
pub use fetch::{FetchConfig, Fetcher, ReqwestFetcher, StaticSite};
pub use session::HtmlSession;

use crate::error::Result;
use ego_tree::NodeId;
use std::time::Duration;

/// Opaque reference to an element of the current document.
///
/// Handles are invalidated by navigation; using a stale one yields
/// "not found" rather than another page's element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    pub(crate) generation: u64,
    pub(crate) id: NodeId,
}

pub trait PageAccessor {
    fn name(&self) -> &'static str;

    /// Navigate the context to `url`. Failure means the context is lost.
    fn load(&mut self, url: &str) -> Result<()>;

    fn current_url(&self) -> Option<&str>;

    fn find(&self, selector: &str) -> Option<NodeHandle>;

    fn find_within(&self, scope: NodeHandle, selector: &str) -> Option<NodeHandle>;

    /// Items matching `item` under the first `container`, in document order.
    fn find_all(&self, container: &str, item: &str) -> Vec<NodeHandle>;

    /// Bounded wait; `None` once `timeout` passes without the node becoming usable.
    fn wait_until_interactable(&mut self, node: NodeHandle, timeout: Duration)
        -> Option<NodeHandle>;

    /// Click the node, navigating wherever it leads.
    fn activate(&mut self, node: NodeHandle) -> Result<()>;

    fn scroll_to_bottom(&mut self) {}

    fn text(&self, node: NodeHandle) -> Option<String>;

    fn attribute(&self, node: NodeHandle, name: &str) -> Option<String>;
}
