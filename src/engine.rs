use crate::policy::HarvestPolicy;
use crate::services::store::CorpusStore;
use crate::tools::batch::RecordBatch;
use crate::tools::dedup::{load_dedup_index, Decision, DedupFilter, DedupMode};
use crate::tools::identity::external_id;
use crate::tools::page::PageAccessor;
use crate::tools::paginate::{paginate, PaginationOutcome};
use crate::tools::resolve::{resolve_product, ResolutionMiss};
use crate::{error::*, types::*};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A candidate the dedup filter turned away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedCandidate {
    pub external_id: ExternalId,
    pub url: String,
}

/// Everything one run produced. Nothing has been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub category: Category,
    pub mode: DedupMode,
    pub batch: RecordBatch,
    pub skipped: Vec<SkippedCandidate>,
    pub misses: Vec<ResolutionMiss>,
    /// Detail pages that could not be served; their records carry only
    /// identity and source URL.
    pub failed_pages: Vec<String>,
    pub pagination: PaginationOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn candidates(&self) -> usize {
        self.batch.len() + self.skipped.len()
    }
}

pub struct Harvester<'a, A: PageAccessor + ?Sized, S: CorpusStore + ?Sized> {
    pub accessor: &'a mut A,
    pub store: &'a S,
    pub policy: &'a HarvestPolicy,
}

impl<'a, A: PageAccessor + ?Sized, S: CorpusStore + ?Sized> Harvester<'a, A, S> {
    pub fn new(accessor: &'a mut A, store: &'a S, policy: &'a HarvestPolicy) -> Self {
        Self {
            accessor,
            store,
            policy,
        }
    }

    /// Walk the listing, then visit every candidate that survives dedup.
    ///
    /// Only a lost browsing context ends the run early; misses, stalls and
    /// malformed ids are all absorbed along the way.
    pub fn run(&mut self) -> Result<RunReport> {
        let started_at = Utc::now();
        let policy = self.policy;
        let category = &policy.category;

        let index = load_dedup_index(self.store, category);
        let filter = DedupFilter::new(policy.dedup_mode, &index);

        self.open_listing()?;
        let pagination = paginate(&mut *self.accessor, &policy.pagination)?;

        let mut candidates = pagination.links.clone();
        if let Some(limit) = policy.limit {
            candidates.truncate(limit);
        }
        tracing::info!(
            %category,
            found = pagination.links.len(),
            visiting = candidates.len(),
            stop = ?pagination.stop,
            "listing walked"
        );

        let mut batch = RecordBatch::new();
        let mut skipped = Vec::new();
        let mut misses = Vec::new();
        let mut failed_pages = Vec::new();

        for url in candidates {
            let id = external_id(&url, &policy.identity);
            if filter.decide(&id) == Decision::Skip {
                tracing::info!(external_id = %id.as_str(), "already captured; skipping");
                skipped.push(SkippedCandidate {
                    external_id: id,
                    url,
                });
                continue;
            }

            let fields = match self.accessor.load(&url) {
                Ok(()) => {
                    self.accessor.scroll_to_bottom();
                    let (fields, page_misses) = resolve_product(&*self.accessor, &policy.fields);
                    misses.extend(page_misses);
                    fields
                }
                Err(e) if e.is_page_failure() => {
                    tracing::warn!(%url, error = %e, "detail page failed; recording without fields");
                    misses.extend(policy.fields.0.iter().map(|spec| ResolutionMiss {
                        field: spec.field,
                        source_url: url.clone(),
                        strategies_tried: 0,
                    }));
                    failed_pages.push(url.clone());
                    ProductFields::default()
                }
                Err(e) => return Err(e),
            };
            batch.push(ProductRecord::new(&url, id, fields));
        }

        Ok(RunReport {
            category: category.clone(),
            mode: policy.dedup_mode,
            batch,
            skipped,
            misses,
            failed_pages,
            pagination,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Load the start page and clear any consent overlay. Dismissal is best
    /// effort; if it navigated away the start page is reloaded.
    fn open_listing(&mut self) -> Result<()> {
        let policy = self.policy;
        let start = policy.start_url.as_str();
        self.accessor.load(start)?;

        let Some(selector) = policy.consent.as_deref() else {
            return Ok(());
        };
        let Some(node) = self.accessor.find(selector) else {
            tracing::debug!(%selector, "no consent control");
            return Ok(());
        };
        let wait = policy.pagination.wait();
        let Some(ready) = self.accessor.wait_until_interactable(node, wait) else {
            tracing::debug!(%selector, "consent control not interactable");
            return Ok(());
        };
        self.accessor.activate(ready)?;
        tracing::info!("consent dismissed");

        if self.accessor.current_url() != Some(start) {
            self.accessor.load(start)?;
        }
        Ok(())
    }

    /// Hand the batch to the corpus. Incremental runs append; a full
    /// refresh replaces stored records with the same external id.
    pub fn persist(&self, report: &RunReport) -> Result<()> {
        persist_report(self.store, report)
    }
}

pub fn persist_report<S: CorpusStore + ?Sized>(store: &S, report: &RunReport) -> Result<()> {
    if report.batch.is_empty() {
        return Ok(());
    }
    let records = report.batch.records();
    match report.mode {
        DedupMode::Incremental => store.append(&report.category, records),
        DedupMode::FullRefresh => store.replace(&report.category, records),
    }
}
