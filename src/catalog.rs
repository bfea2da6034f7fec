//! Candidate catalog loading.
//!
//! The catalog is a JSON array of [`Bottle`] records. It is read once and
//! treated as read-only.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use crate::models::Bottle;

pub fn load_catalog(path: &Path) -> Result<Vec<Bottle>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
    parse_catalog(&content).with_context(|| format!("Invalid catalog: {}", path.display()))
}

/// Parse a catalog.
///
/// Only the bottle shape is checked. Duplicate ids are kept and logged;
/// the aggregator collapses them to one recommendation per id.
pub fn parse_catalog(content: &str) -> Result<Vec<Bottle>> {
    let bottles: Vec<Bottle> = serde_json::from_str(content)?;

    let mut seen = HashSet::with_capacity(bottles.len());
    for b in &bottles {
        if !seen.insert(b.id) {
            tracing::warn!(id = b.id, name = %b.name, "duplicate bottle id in catalog");
        }
    }

    tracing::debug!(bottles = bottles.len(), "catalog loaded");
    Ok(bottles)
}

/// Look a bottle up by id.
pub fn find_bottle(catalog: &[Bottle], id: i64) -> Option<&Bottle> {
    catalog.iter().find(|b| b.id == id)
}
