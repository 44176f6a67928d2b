//! Field Resolution
//!
//! Each field carries an ordered list of strategies. They are tried strictly
//! in order and the first one that finds a node with non-empty normalized
//! text wins, even if a later strategy would have produced "better" text.
//! Lookups that find nothing are expected and stay silent apart from a
//! debug line; a field whose strategies all fail resolves to
//! [`FieldValue::Missing`].

pub mod types;
mod utils;

pub use types::*;
use utils::*;

use crate::tools::page::PageAccessor;
use crate::types::{FieldValue, ProductFields};

/// Resolve one field against the accessor's current document.
pub fn resolve<A: PageAccessor + ?Sized>(accessor: &A, spec: &FieldSpec) -> Resolution {
    for (idx, strategy) in spec.strategies.iter().enumerate() {
        let Some(raw) = locate(accessor, strategy) else {
            continue;
        };
        if let Some(value) = normalize(raw, strategy.transforms()) {
            return Resolution {
                value: FieldValue::Found(value),
                strategy: Some(idx),
            };
        }
    }
    Resolution {
        value: FieldValue::Missing,
        strategy: None,
    }
}

/// Resolve every field in `table`; fields absent from the table stay missing.
pub fn resolve_product<A: PageAccessor + ?Sized>(
    accessor: &A,
    table: &FieldTable,
) -> (ProductFields, Vec<ResolutionMiss>) {
    let source_url = accessor.current_url().unwrap_or_default().to_string();
    let mut fields = ProductFields::default();
    let mut misses = Vec::new();

    for spec in &table.0 {
        let resolution = resolve(accessor, spec);
        match resolution.strategy {
            Some(idx) => {
                tracing::trace!(field = %spec.field, strategy = idx, "field resolved");
            }
            None => {
                tracing::debug!(field = %spec.field, url = %source_url, "resolution miss");
                misses.push(ResolutionMiss {
                    field: spec.field,
                    source_url: source_url.clone(),
                    strategies_tried: spec.strategies.len(),
                });
            }
        }
        fields.set(spec.field, resolution.value);
    }

    (fields, misses)
}
