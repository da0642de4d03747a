//! Image metadata store - the read-only materials dataset.
//!
//! Loaded once from a JSON array produced by the offline data pipeline.
//! Structural problems (bad JSON, missing or non-numeric fields, duplicate
//! ids) fail the load. Unusable dimensions are a data-integrity problem: the
//! record is kept with the dimension zeroed, and layout falls back to a
//! square aspect ratio for it.

use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use ristill_api::{ImageRecord, RecordId};
use serde::Deserialize;

use crate::error::GalleryError;

/// A dataset entry as written by the pipeline, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    id: String,
    display_name: String,
    url: String,
    size: i64,
    mod_time: DateTime<Utc>,
    #[serde(default)]
    original_name: Option<String>,
    width: i64,
    height: i64,
}

/// The ordered, immutable materials dataset.
#[derive(Debug, Clone, Default)]
pub struct MaterialStore {
    records: Vec<ImageRecord>,
    /// Ids in dataset order; position in the set == position in `records`.
    ids: IndexSet<RecordId>,
}

impl MaterialStore {
    /// Load the dataset from a JSON file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, GalleryError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::load_from_str(&json)
    }

    /// Parse and validate a JSON dataset.
    pub fn load_from_str(json: &str) -> Result<Self, GalleryError> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut records = Vec::with_capacity(entries.len());

        for (index, entry) in entries.into_iter().enumerate() {
            let raw: RawRecord = serde_json::from_value(entry)
                .map_err(|e| GalleryError::Dataset(format!("record {index}: {e}")))?;
            records.push(validate(raw));
        }

        Self::from_records(records)
    }

    /// Build a store from already-typed records. Fails on duplicate ids.
    pub fn from_records(records: Vec<ImageRecord>) -> Result<Self, GalleryError> {
        let mut ids = IndexSet::with_capacity(records.len());
        for record in &records {
            if !ids.insert(record.id.clone()) {
                return Err(GalleryError::Dataset(format!("duplicate id {}", record.id)));
            }
        }
        Ok(Self { records, ids })
    }

    /// All records in dataset order.
    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&ImageRecord> {
        self.position(id).map(|index| &self.records[index])
    }

    /// 0-based dataset position of a record.
    pub fn position(&self, id: &RecordId) -> Option<usize> {
        self.ids.get_index_of(id)
    }

    pub fn get_index(&self, index: usize) -> Option<&ImageRecord> {
        self.records.get(index)
    }
}

fn validate(raw: RawRecord) -> ImageRecord {
    let width = dimension(&raw.id, "width", raw.width);
    let height = dimension(&raw.id, "height", raw.height);
    let size_bytes = u64::try_from(raw.size).unwrap_or_else(|_| {
        tracing::warn!(id = %raw.id, size = raw.size, "negative size in dataset; using 0");
        0
    });

    ImageRecord {
        id: RecordId::new(raw.id),
        display_name: raw.display_name,
        source_url: raw.url,
        size_bytes,
        modified_at: raw.mod_time,
        original_name: raw.original_name.unwrap_or_default(),
        width,
        height,
    }
}

/// Clamp a dimension to a usable `u32`, or 0 when it is not positive.
fn dimension(id: &str, field: &str, value: i64) -> u32 {
    match u32::try_from(value) {
        Ok(v) if v > 0 => v,
        _ => {
            tracing::warn!(id, field, value, "unusable image dimension; laying out as square");
            0
        }
    }
}
