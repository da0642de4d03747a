//! Per-column virtualization state, as persisted across navigation.

use serde::{Deserialize, Serialize};

/// A measured item height recorded by a column virtualizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasuredItem {
    pub index: usize,
    pub height: f32,
}

/// Snapshot of a virtualizer's measurement cache.
///
/// Opaque to everything except the virtualizer that exported it: the cache
/// stores and returns it verbatim so a remounted column can skip
/// re-measuring items it has already seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Placeholder height used for unmeasured items when the snapshot was taken.
    pub estimated_height: f32,
    /// Sparse list of measured items, ascending by index.
    pub measured: Vec<MeasuredItem>,
}

impl CacheSnapshot {
    pub fn is_empty(&self) -> bool {
        self.measured.is_empty()
    }
}

/// First visible item of a column and how far the viewport top is into it.
///
/// `index` is 0-based within the column; `offset_within` is in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollAnchor {
    pub index: usize,
    pub offset_within: f32,
}

/// Scroll state of one column.
///
/// `item_count` is the validity fingerprint: a stored state is only applied
/// to a column holding exactly the same number of items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualizationState {
    pub visible_start_index: usize,
    pub viewport_offset: f32,
    pub layout_cache: CacheSnapshot,
    pub item_count: usize,
}
