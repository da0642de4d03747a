//! Dataset records - one contributed image used as a mosaic tile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a record. Used as the routing key and as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Aspect ratio (height / width) substituted for records without usable
/// dimensions.
pub const FALLBACK_ASPECT_RATIO: f32 = 1.0;

/// One image of the materials dataset.
///
/// Intrinsic `width`/`height` are known before the image loads, which lets
/// the layout reserve space up front. A zero dimension marks a record whose
/// source data was unusable; see [`ImageRecord::aspect_ratio`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: RecordId,
    pub display_name: String,
    #[serde(rename = "url")]
    pub source_url: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(rename = "modTime")]
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub original_name: String,
    pub width: u32,
    pub height: u32,
}

impl ImageRecord {
    /// Whether both intrinsic dimensions are usable for layout.
    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Height divided by width, or [`FALLBACK_ASPECT_RATIO`] when either
    /// dimension is zero. Never NaN or infinite.
    pub fn aspect_ratio(&self) -> f32 {
        if !self.has_dimensions() {
            return FALLBACK_ASPECT_RATIO;
        }
        let ratio = self.height as f32 / self.width as f32;
        if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            FALLBACK_ASPECT_RATIO
        }
    }

    /// Height this image occupies when scaled to `width` pixels.
    pub fn scaled_height(&self, width: f32) -> f32 {
        width.max(0.0) * self.aspect_ratio()
    }
}

/// Identifier of one gallery column. Keys the persisted per-column state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(pub String);

impl ColumnId {
    /// Column ids are positional: the same column slot keeps its id across
    /// remounts so saved state can find it again.
    pub fn for_index(index: usize) -> Self {
        Self(format!("column-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
