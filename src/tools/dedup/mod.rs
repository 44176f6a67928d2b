//! Dedup Tools
//!
//! Decides per candidate link whether it is already in the corpus. The
//! index is a read-only snapshot for the whole run.


use crate::tools::identity::ExternalId;
use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Policy selected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupMode {
    /// Skip anything already in the index.
    #[default]
    Incremental,
    /// Never skip; persistence replaces conflicting records instead.
    FullRefresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Skip,
    Proceed,
}

/// External ids already captured for a category.
#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    keys: HashSet<String>,
    available: bool,
}

impl DedupIndex {
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            available: true,
        }
    }

    /// The persisted corpus could not be read; behaves as empty.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, id: &ExternalId) -> bool {
        match id {
            ExternalId::Valid(token) => self.keys.contains(token),
            ExternalId::Malformed => false,
        }
    }
}

pub struct DedupFilter<'a> {
    mode: DedupMode,
    index: &'a DedupIndex,
}

impl<'a> DedupFilter<'a> {
    pub fn new(mode: DedupMode, index: &'a DedupIndex) -> Self {
        Self { mode, index }
    }

    pub fn mode(&self) -> DedupMode {
        self.mode
    }

    /// Malformed ids always proceed so a real product is never dropped.
    pub fn decide(&self, id: &ExternalId) -> Decision {
        match self.mode {
            DedupMode::FullRefresh => Decision::Proceed,
            DedupMode::Incremental if self.index.contains(id) => Decision::Skip,
            DedupMode::Incremental => Decision::Proceed,
        }
    }
}

/// Source of previously captured ids for a category.
pub trait IndexSource {
    fn load_index(&self, category: &Category) -> crate::error::Result<HashSet<String>>;
}

/// Load the index, treating any failure as an empty corpus.
pub fn load_dedup_index<S: IndexSource + ?Sized>(source: &S, category: &Category) -> DedupIndex {
    match source.load_index(category) {
        Ok(keys) => {
            tracing::info!(%category, known = keys.len(), "dedup index loaded");
            DedupIndex::from_keys(keys)
        }
        Err(e) => {
            tracing::warn!(%category, error = %e, "dedup index unavailable; treating corpus as empty");
            DedupIndex::unavailable()
        }
    }
}
