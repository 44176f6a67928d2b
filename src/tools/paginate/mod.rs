//! Pagination Tools

pub mod types;

pub use types::*;

use crate::error::Result;
use crate::tools::page::{NodeHandle, PageAccessor};
use url::Url;

/// Walks listing pages from the accessor's current page until no usable
/// "next" control remains or the page budget is spent.
pub struct PaginationController<'a> {
    cfg: &'a PaginationConfig,
    state: PaginationState,
    links: Vec<String>,
    pages_visited: u32,
}

impl<'a> PaginationController<'a> {
    pub fn new(cfg: &'a PaginationConfig) -> Self {
        let state = if cfg.page_budget == 0 {
            PaginationState::Exhausted(StopReason::BudgetReached)
        } else {
            PaginationState::OnListingPage { page: 1 }
        };
        Self {
            cfg,
            state,
            links: Vec::new(),
            pages_visited: 0,
        }
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    /// Collect the current page, then move to the next page or exhaust.
    pub fn step<A: PageAccessor + ?Sized>(&mut self, accessor: &mut A) -> Result<PaginationState> {
        let PaginationState::OnListingPage { page } = self.state else {
            return Ok(self.state);
        };

        let found = collect_links(accessor, self.cfg);
        tracing::info!(page, links = found.len(), url = ?accessor.current_url(), "listing page collected");
        self.links.extend(found);
        self.pages_visited += 1;

        self.state = if page >= self.cfg.page_budget {
            PaginationState::Exhausted(StopReason::BudgetReached)
        } else {
            match self.next_control(accessor) {
                Ok(node) => match accessor.activate(node) {
                    Ok(()) => PaginationState::OnListingPage { page: page + 1 },
                    Err(e) if e.is_page_failure() => {
                        tracing::warn!(page, error = %e, "next page failed to load; stopping pagination");
                        PaginationState::Exhausted(StopReason::Stalled)
                    }
                    Err(e) => return Err(e),
                },
                Err(reason) => PaginationState::Exhausted(reason),
            }
        };
        Ok(self.state)
    }

    pub fn run<A: PageAccessor + ?Sized>(mut self, accessor: &mut A) -> Result<PaginationOutcome> {
        loop {
            if let PaginationState::Exhausted(stop) = self.step(accessor)? {
                return Ok(PaginationOutcome {
                    links: self.links,
                    pages_visited: self.pages_visited,
                    stop,
                });
            }
        }
    }

    /// Locate the "next" control and wait for it, scrolling between bounded
    /// retries. A control that never becomes usable counts as absent.
    fn next_control<A: PageAccessor + ?Sized>(
        &self,
        accessor: &mut A,
    ) -> std::result::Result<NodeHandle, StopReason> {
        let Some(node) = accessor.find(&self.cfg.next) else {
            return Err(StopReason::NoNextControl);
        };
        if let Some(ready) = accessor.wait_until_interactable(node, self.cfg.wait()) {
            return Ok(ready);
        }
        for attempt in 1..=self.cfg.scroll_retries {
            accessor.scroll_to_bottom();
            let Some(node) = accessor.find(&self.cfg.next) else {
                return Err(StopReason::NoNextControl);
            };
            if let Some(ready) = accessor.wait_until_interactable(node, self.cfg.wait()) {
                return Ok(ready);
            }
            tracing::debug!(attempt, "next control not interactable yet");
        }
        tracing::warn!(
            selector = %self.cfg.next,
            retries = self.cfg.scroll_retries,
            "next control never became interactable; stopping pagination"
        );
        Err(StopReason::Stalled)
    }
}

/// Run pagination from the accessor's current listing page.
pub fn paginate<A: PageAccessor + ?Sized>(
    accessor: &mut A,
    cfg: &PaginationConfig,
) -> Result<PaginationOutcome> {
    PaginationController::new(cfg).run(accessor)
}

/// Candidate links on the current page, in listing order. Duplicates are kept.
pub fn collect_links<A: PageAccessor + ?Sized>(accessor: &A, cfg: &PaginationConfig) -> Vec<String> {
    let base = accessor.current_url().and_then(|u| Url::parse(u).ok());
    accessor
        .find_all(&cfg.container, &cfg.item)
        .into_iter()
        .filter_map(|item| {
            let link = accessor.find_within(item, &cfg.link)?;
            let href = accessor.attribute(link, "href")?;
            absolutize(base.as_ref(), &href)
        })
        .collect()
}

fn absolutize(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let url = match Url::parse(href) {
        Ok(u) => u,
        Err(_) => base?.join(href).ok()?,
    };
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}
