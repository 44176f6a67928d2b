use super::{Fetcher, HtmlDocument, NodeHandle, PageAccessor};
use crate::error::{HarvestError, Result};
use std::time::Duration;

/// Browsing context over parsed HTML. Documents never change after
/// loading, so an interactability wait is answered immediately.
pub struct HtmlSession<F: Fetcher> {
    fetcher: F,
    current: Option<HtmlDocument>,
    generation: u64,
    history: Vec<String>,
}

impl<F: Fetcher> HtmlSession<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            current: None,
            generation: 0,
            history: Vec::new(),
        }
    }

    /// URLs loaded so far, in navigation order.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn document(&self) -> Option<&HtmlDocument> {
        self.current.as_ref()
    }
}

impl<F: Fetcher> PageAccessor for HtmlSession<F> {
    fn name(&self) -> &'static str {
        self.fetcher.name()
    }

    fn load(&mut self, url: &str) -> Result<()> {
        let body = self.fetcher.fetch_blocking(url)?;
        self.generation += 1;
        self.current = Some(HtmlDocument::parse(url, &body, self.generation));
        self.history.push(url.to_string());
        tracing::debug!(%url, fetcher = self.fetcher.name(), "page loaded");
        Ok(())
    }

    fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|d| d.url())
    }

    fn find(&self, selector: &str) -> Option<NodeHandle> {
        self.current.as_ref()?.find(selector)
    }

    fn find_within(&self, scope: NodeHandle, selector: &str) -> Option<NodeHandle> {
        self.current.as_ref()?.find_within(scope, selector)
    }

    fn find_all(&self, container: &str, item: &str) -> Vec<NodeHandle> {
        self.current
            .as_ref()
            .map(|d| d.find_all(container, item))
            .unwrap_or_default()
    }

    fn wait_until_interactable(
        &mut self,
        node: NodeHandle,
        _timeout: Duration,
    ) -> Option<NodeHandle> {
        self.current
            .as_ref()
            .filter(|d| d.is_interactable(node))
            .map(|_| node)
    }

    fn activate(&mut self, node: NodeHandle) -> Result<()> {
        let doc = self
            .current
            .as_ref()
            .ok_or_else(|| HarvestError::page_unavailable("about:blank", "no document loaded"))?;
        let target = doc
            .link_target(node)
            .ok_or_else(|| HarvestError::page_failed(doc.url(), "activated node has no link"))?;
        self.load(&target)
    }

    fn text(&self, node: NodeHandle) -> Option<String> {
        self.current.as_ref()?.text(node)
    }

    fn attribute(&self, node: NodeHandle, name: &str) -> Option<String> {
        self.current.as_ref()?.attribute(node, name)
    }
}
