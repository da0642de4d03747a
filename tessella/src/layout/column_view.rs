//! ColumnVirtualizer - the rendered window of one masonry column.
//!
//! Only items intersecting the viewport, plus `overscan` items past each
//! edge, are rendered. Everything else is replaced by a top and a bottom
//! spacer so the column keeps its full scroll height.
//!
//! # Measurement states
//!
//! - `Unmeasured`: nothing rendered or measured yet; every height is the estimate.
//! - `Measuring`: some rendered item still has no real height.
//! - `Settled`: every item ever rendered has been measured. Measured heights
//!   are final for the rest of the session; a later measurement of the same
//!   item is ignored. `reset` (dataset or column change) returns to `Unmeasured`.
//!
//! # Example
//!
//! ```ignore
//! let mut column = ColumnVirtualizer::new(items.len(), 302.0, 24.0);
//! if let Some(range) = column.set_viewport(scroll_top - column_top, viewport_height) {
//!     for index in range {
//!         column.record_measurement(index, measured_height(index));
//!     }
//! }
//! let layout = column.layout();
//! ```

use std::ops::Range;

use ristill_api::{CacheSnapshot, ScrollAnchor};

use super::cache::MeasurementCache;

/// Number of extra items to render above/below the viewport.
pub const DEFAULT_OVERSCAN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureState {
    Unmeasured,
    Measuring,
    Settled,
}

/// Position of one rendered item, relative to the column top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub index: usize,
    pub top: f32,
    pub height: f32,
}

/// The rendered window of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub top_spacer: f32,
    pub bottom_spacer: f32,
    pub total_height: f32,
    pub placements: Vec<Placement>,
}

/// Virtualized column with a measurement cache.
#[derive(Debug, Clone)]
pub struct ColumnVirtualizer {
    cache: MeasurementCache,
    overscan: usize,
    /// Viewport top, relative to the column top. Negative while the column
    /// is still below the top of the viewport.
    scroll_offset: f32,
    viewport_height: f32,
    range: Range<usize>,
    rendered_ever: Vec<bool>,
    /// Rendered at least once but not measured yet.
    pending: usize,
    state: MeasureState,
}

impl ColumnVirtualizer {
    pub fn new(item_count: usize, estimated_height: f32, spacing: f32) -> Self {
        Self {
            cache: MeasurementCache::new(item_count, estimated_height, spacing),
            overscan: DEFAULT_OVERSCAN,
            scroll_offset: 0.0,
            viewport_height: 0.0,
            range: 0..0,
            rendered_ever: vec![false; item_count],
            pending: 0,
            state: MeasureState::Unmeasured,
        }
    }

    /// Set how many items past each viewport edge are rendered.
    pub fn overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn item_count(&self) -> usize {
        self.cache.len()
    }

    pub fn state(&self) -> MeasureState {
        self.state
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn total_height(&self) -> f32 {
        self.cache.total_height()
    }

    pub fn cache(&self) -> &MeasurementCache {
        &self.cache
    }

    /// Indices currently rendered (viewport plus overscan).
    pub fn visible_range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Drop measurements and the rendered window; used when the column's
    /// items or width change.
    pub fn reset(&mut self, item_count: usize, estimated_height: f32) {
        self.cache.reset(item_count, estimated_height);
        self.rendered_ever = vec![false; item_count];
        self.range = 0..0;
        self.pending = 0;
        self.state = MeasureState::Unmeasured;
        self.recompute_range();
    }

    // =====================================================================
    // Scrolling
    // =====================================================================

    /// Update the viewport. Returns the new rendered range if it changed.
    pub fn set_viewport(&mut self, scroll_offset: f32, viewport_height: f32) -> Option<Range<usize>> {
        self.scroll_offset = if scroll_offset.is_finite() { scroll_offset } else { 0.0 };
        self.viewport_height = if viewport_height.is_finite() {
            viewport_height.max(0.0)
        } else {
            0.0
        };
        self.recompute_range()
    }

    /// Scroll the column so the item at `index` sits at the viewport top.
    ///
    /// Returns the column-relative offset that was applied.
    pub fn scroll_to_index(&mut self, index: usize) -> f32 {
        let n = self.item_count();
        let target = if n == 0 {
            0.0
        } else {
            self.cache.offset_for(index.min(n - 1))
        };
        self.scroll_offset = target;
        self.recompute_range();
        target
    }

    /// First item intersecting the viewport (overscan excluded).
    pub fn find_visible_start_index(&self) -> usize {
        self.cache.index_for_offset(self.scroll_offset.max(0.0))
    }

    /// First visible item and the viewport top's offset into it.
    pub fn anchor(&self) -> ScrollAnchor {
        let index = self.find_visible_start_index();
        let offset_within = (self.scroll_offset.max(0.0) - self.cache.offset_for(index)).max(0.0);
        ScrollAnchor {
            index,
            offset_within,
        }
    }

    // =====================================================================
    // Measurement
    // =====================================================================

    /// Record the real height of a rendered item.
    ///
    /// Ignored for items that were never rendered and for items that already
    /// have a measurement. Returns `true` if the height was recorded.
    pub fn record_measurement(&mut self, index: usize, height: f32) -> bool {
        if !self.rendered_ever.get(index).copied().unwrap_or(false) || self.cache.is_measured(index) {
            return false;
        }
        if !self.cache.record(index, height) {
            return false;
        }
        self.pending = self.pending.saturating_sub(1);
        self.refresh_state();
        // Heights above the viewport moved; the window may have shifted.
        self.recompute_range();
        true
    }

    pub fn export_cache(&self) -> CacheSnapshot {
        self.cache.export()
    }

    /// Seed the cache with previously exported measurements. A snapshot
    /// taken at another column width is ignored and returns 0.
    pub fn import_cache(&mut self, snapshot: &CacheSnapshot) -> usize {
        let applied = self.cache.import(snapshot);
        self.pending = self
            .rendered_ever
            .iter()
            .enumerate()
            .filter(|(index, rendered)| **rendered && !self.cache.is_measured(*index))
            .count();
        self.refresh_state();
        self.recompute_range();
        applied
    }

    // =====================================================================
    // Layout
    // =====================================================================

    /// Spacers plus placements of the rendered items.
    pub fn layout(&self) -> ColumnLayout {
        let total_height = self.cache.total_height();
        if self.range.is_empty() {
            return ColumnLayout {
                top_spacer: total_height,
                bottom_spacer: 0.0,
                total_height,
                placements: Vec::new(),
            };
        }

        let placements: Vec<Placement> = self
            .range
            .clone()
            .map(|index| Placement {
                index,
                top: self.cache.offset_for(index),
                height: self.cache.height_of(index),
            })
            .collect();

        let top_spacer = self.cache.offset_for(self.range.start);
        let rendered_bottom = placements
            .last()
            .map(|p| p.top + p.height)
            .unwrap_or(top_spacer);

        ColumnLayout {
            top_spacer,
            bottom_spacer: (total_height - rendered_bottom).max(0.0),
            total_height,
            placements,
        }
    }

    fn recompute_range(&mut self) -> Option<Range<usize>> {
        let range = self.compute_range();
        if range == self.range {
            return None;
        }
        for index in range.clone() {
            if !self.rendered_ever[index] {
                self.rendered_ever[index] = true;
                if !self.cache.is_measured(index) {
                    self.pending += 1;
                }
            }
        }
        self.range = range.clone();
        self.refresh_state();
        Some(range)
    }

    fn compute_range(&self) -> Range<usize> {
        let n = self.item_count();
        let top = self.scroll_offset;
        let bottom = top + self.viewport_height;
        if n == 0 || self.viewport_height <= 0.0 || bottom <= 0.0 || top >= self.cache.total_height() {
            return 0..0;
        }

        let first = self.cache.index_for_offset(top.max(0.0));
        let last = self.cache.index_for_offset(bottom);
        first.saturating_sub(self.overscan)..(last + 1 + self.overscan).min(n)
    }

    fn refresh_state(&mut self) {
        self.state = if self.pending > 0 {
            MeasureState::Measuring
        } else if self.cache.measured_count() > 0 {
            MeasureState::Settled
        } else {
            MeasureState::Unmeasured
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ristill_api::MeasuredItem;

    fn column(count: usize) -> ColumnVirtualizer {
        // 100px items, 10px gaps: item i starts at 110 * i
        ColumnVirtualizer::new(count, 100.0, 10.0)
    }

    #[test]
    fn renders_viewport_plus_overscan() {
        let mut col = column(100);
        let range = col.set_viewport(1100.0, 500.0).unwrap();
        // viewport covers items 10..=14, overscan 2 each side
        assert_eq!(range, 8..17);
        assert_eq!(col.find_visible_start_index(), 10);
    }

    #[test]
    fn overscan_is_clamped_at_edges() {
        let mut col = column(5).overscan(3);
        assert_eq!(col.set_viewport(0.0, 150.0), Some(0..5));
        let mut col = column(50);
        assert_eq!(col.set_viewport(0.0, 250.0), Some(0..5));
    }

    #[test]
    fn unchanged_window_reports_nothing() {
        let mut col = column(100);
        assert!(col.set_viewport(0.0, 300.0).is_some());
        assert!(col.set_viewport(5.0, 300.0).is_none());
    }

    #[test]
    fn column_below_viewport_renders_nothing() {
        let mut col = column(10);
        assert_eq!(col.set_viewport(-800.0, 600.0), None);
        assert!(col.visible_range().is_empty());
        assert_eq!(col.layout().top_spacer, col.total_height());
    }

    #[test]
    fn measuring_then_settled() {
        let mut col = column(20);
        assert_eq!(col.state(), MeasureState::Unmeasured);

        let range = col.set_viewport(0.0, 200.0).unwrap();
        assert_eq!(col.state(), MeasureState::Measuring);

        for index in range.clone() {
            col.record_measurement(index, 150.0);
        }
        assert_eq!(col.visible_range(), range);
        assert_eq!(col.state(), MeasureState::Settled);

        // A later measurement of a measured item is ignored.
        assert!(!col.record_measurement(range.start, 999.0));
        assert_eq!(col.cache().height_of(range.start), 150.0);
    }

    #[test]
    fn unrendered_items_cannot_be_measured() {
        let mut col = column(20);
        col.set_viewport(0.0, 200.0);
        assert!(!col.record_measurement(19, 50.0));
        assert!(!col.cache().is_measured(19));
    }

    #[test]
    fn new_items_resume_measuring() {
        let mut col = column(30);
        let range = col.set_viewport(0.0, 200.0).unwrap();
        for index in range {
            col.record_measurement(index, 100.0);
        }
        assert_eq!(col.state(), MeasureState::Settled);

        col.set_viewport(2000.0, 200.0);
        assert_eq!(col.state(), MeasureState::Measuring);
    }

    #[test]
    fn scroll_to_index_aligns_item_top() {
        let mut col = column(50);
        col.set_viewport(0.0, 400.0);
        assert_eq!(col.scroll_to_index(7), 770.0);
        assert_eq!(col.find_visible_start_index(), 7);
        assert_eq!(col.anchor(), ScrollAnchor { index: 7, offset_within: 0.0 });

        // Past-the-end indices clamp to the last item.
        assert_eq!(col.scroll_to_index(500), 49.0 * 110.0);
    }

    #[test]
    fn layout_spacers_cover_unrendered_items() {
        let mut col = column(100);
        col.set_viewport(1100.0, 500.0);
        let layout = col.layout();
        assert_eq!(layout.placements.first().map(|p| p.index), Some(8));
        assert_eq!(layout.placements.len(), 9);
        assert_eq!(layout.top_spacer, 880.0);
        // item 16 ends at 1860; 100 items end at 10990
        assert_eq!(layout.total_height, 10990.0);
        assert_eq!(layout.bottom_spacer, 9130.0);
    }

    #[test]
    fn imported_cache_avoids_remeasuring() {
        let mut col = column(10);
        let snapshot = CacheSnapshot {
            estimated_height: 100.0,
            measured: vec![
                MeasuredItem { index: 0, height: 200.0 },
                MeasuredItem { index: 1, height: 200.0 },
            ],
        };
        assert_eq!(col.import_cache(&snapshot), 2);
        assert_eq!(col.scroll_to_index(2), 420.0);
        assert_eq!(col.export_cache(), snapshot);
    }

    #[test]
    fn snapshot_from_another_width_is_remeasured() {
        let mut col = column(10);
        let snapshot = CacheSnapshot {
            estimated_height: 80.0,
            measured: vec![MeasuredItem { index: 0, height: 60.0 }],
        };
        assert_eq!(col.import_cache(&snapshot), 0);
        assert_eq!(col.state(), MeasureState::Unmeasured);

        col.set_viewport(0.0, 200.0);
        assert!(col.record_measurement(0, 130.0));
        assert_eq!(col.cache().height_of(0), 130.0);
    }

    #[test]
    fn reset_returns_to_unmeasured() {
        let mut col = column(10);
        let range = col.set_viewport(0.0, 300.0).unwrap();
        for index in range {
            col.record_measurement(index, 120.0);
        }
        col.reset(6, 80.0);
        assert_eq!(col.state(), MeasureState::Unmeasured);
        assert_eq!(col.item_count(), 6);
        assert_eq!(col.cache().measured_count(), 0);
    }
}
