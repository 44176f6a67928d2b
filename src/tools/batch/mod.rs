//! Batch Tools

mod tests;

use crate::error::Result;
use crate::tools::identity::ExternalId;
use crate::types::ProductRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One image to hand to the download collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageJob {
    pub external_id: ExternalId,
    pub url: String,
    /// Target file name, numbered after images already on disk.
    pub file_name: String,
}

/// Records of one run, in the order candidates were visited.
///
/// No deduplication happens here: if the same product was visited twice
/// it appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordBatch {
    records: Vec<ProductRecord>,
}

impl RecordBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ProductRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ProductRecord> {
        self.records
    }

    /// Image URLs in batch order; records without one are left out.
    pub fn image_urls(&self) -> Vec<&str> {
        self.records.iter().filter_map(|r| r.image_url()).collect()
    }

    /// Numbered `<n>.jpg` targets, continuing from `existing` files.
    pub fn image_manifest(&self, existing: usize) -> Vec<ImageJob> {
        self.records
            .iter()
            .filter_map(|r| r.image_url().map(|url| (r, url)))
            .enumerate()
            .map(|(i, (r, url))| ImageJob {
                external_id: r.external_id.clone(),
                url: url.to_string(),
                file_name: format!("{}.jpg", existing + i),
            })
            .collect()
    }

    /// JSON array, one object per record.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(file, &self.records)?;
        Ok(())
    }
}

impl FromIterator<ProductRecord> for RecordBatch {
    fn from_iter<T: IntoIterator<Item = ProductRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Extend<ProductRecord> for RecordBatch {
    fn extend<T: IntoIterator<Item = ProductRecord>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}
