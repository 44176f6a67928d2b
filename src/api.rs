use crate::engine::{Harvester, RunReport};
use crate::policy::{default_policy, validate_policy, HarvestPolicy};
use crate::services::log::ActivityLogger;
use crate::services::store::{CorpusStore, LocalFsStore};
use crate::tools::batch::ImageJob;
use crate::tools::dedup::DedupMode;
use crate::tools::page::{HtmlSession, PageAccessor, ReqwestFetcher};
use crate::{error::*, types::*};
use std::fs;
use std::path::Path;
use std::time::Instant;

// Journal failures never break a run.
fn log_info(category: Option<&str>, event: &str, details: Option<&str>) -> Result<()> {
    match ActivityLogger::new() {
        Ok(logger) => logger.info(category, event, details),
        Err(_) => Ok(()),
    }
}

fn log_error(category: Option<&str>, event: &str, details: Option<&str>) -> Result<()> {
    match ActivityLogger::new() {
        Ok(logger) => logger.error(category, event, details),
        Err(_) => Ok(()),
    }
}

/* ------------ harvesting ------------ */

/// Run one policy end to end and persist the batch.
pub fn harvest<A, S>(accessor: &mut A, store: &S, policy: &HarvestPolicy) -> Result<RunReport>
where
    A: PageAccessor + ?Sized,
    S: CorpusStore + ?Sized,
{
    let start_time = Instant::now();
    let category = policy.category.as_str();

    let result = validate_policy(policy).and_then(|_| {
        let mut harvester = Harvester::new(accessor, store, policy);
        let report = harvester.run()?;
        harvester.persist(&report)?;
        Ok(report)
    });
    let duration = start_time.elapsed();

    match &result {
        Ok(report) => {
            let details = format!(
                "{} records, {} skipped in {}ms",
                report.batch.len(),
                report.skipped.len(),
                duration.as_millis()
            );
            let _ = log_info(Some(category), "harvest", Some(&details));
        }
        Err(e) => {
            let details = format!("failed in {}ms: {e}", duration.as_millis());
            let _ = log_error(Some(category), "harvest", Some(&details));
        }
    }

    result
}

/// Harvest a live listing over HTTP into the default local corpus.
pub fn harvest_listing(listing: Listing, mode: DedupMode, limit: Option<usize>) -> Result<RunReport> {
    let mut policy = default_policy(listing).with_mode(mode);
    policy.limit = limit;

    let fetcher = ReqwestFetcher::new(policy.fetch.clone())?;
    let mut session = HtmlSession::new(fetcher);
    let store = LocalFsStore::new()?;
    harvest(&mut session, &store, &policy)
}

/* ------------ corpus helpers ------------ */

/// Stored external ids for a category, sorted.
pub fn read_index<S: CorpusStore + ?Sized>(store: &S, target: &str) -> Result<Vec<String>> {
    let mut ids: Vec<String> = store
        .load_index(&Category::from_raw(target))?
        .into_iter()
        .collect();
    ids.sort();
    Ok(ids)
}

pub fn list_categories<S: CorpusStore + ?Sized>(store: &S) -> Result<Vec<String>> {
    Ok(store.categories()?.into_iter().map(|c| c.0).collect())
}

/// Write `data.json` into `dir` and number the batch's images after the
/// `.jpg` files already in `dir/images`. Downloading is left to the caller.
pub fn export_report(report: &RunReport, dir: &Path) -> Result<Vec<ImageJob>> {
    report.batch.write_json(&dir.join("data.json"))?;

    let images = dir.join("images");
    let existing = if images.is_dir() {
        fs::read_dir(&images)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("jpg"))
            .count()
    } else {
        0
    };
    let jobs = report.batch.image_manifest(existing);
    let _ = log_info(
        Some(report.category.as_str()),
        "export",
        Some(&format!("{} records, {} images queued", report.batch.len(), jobs.len())),
    );
    Ok(jobs)
}
