//! One mounted gallery column: its items, virtualizer and save timer.

use std::ops::Range;
use std::rc::Rc;

use chrono::TimeDelta;
use ristill_api::{ColumnId, ImageRecord, ScrollAnchor, VirtualizationState};
use tessella::{ColumnAssignment, ColumnVirtualizer, ResolvedLayout};

use super::measure::Measurer;
use super::registry::{SharedColumn, VirtualizerHandle};
use crate::debounce::Debouncer;

/// Measuring can grow or shrink the window; stop chasing it after this many
/// passes.
const MAX_MEASURE_PASSES: usize = 4;

pub struct MountedColumn {
    pub id: ColumnId,
    /// Slot of this column, left to right.
    pub slot: usize,
    /// Dataset indices, in column order.
    items: Vec<usize>,
    view: SharedColumn,
    pub(super) debounce: Debouncer,
    /// Last window announced to subscribers.
    announced: Range<usize>,
}

impl MountedColumn {
    pub fn new(
        assignment: ColumnAssignment,
        slot: usize,
        layout: &ResolvedLayout,
        overscan: usize,
        debounce: TimeDelta,
    ) -> Self {
        let view = ColumnVirtualizer::new(
            assignment.items.len(),
            layout.estimated_item_height,
            layout.row_gap,
        )
        .overscan(overscan);

        Self {
            id: assignment.column_id,
            slot,
            items: assignment.items,
            view: SharedColumn::new(view),
            debounce: Debouncer::new(debounce),
            announced: 0..0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Dataset index of the item at `index` within this column.
    pub fn dataset_index(&self, index: usize) -> Option<usize> {
        self.items.get(index).copied()
    }

    pub fn view(&self) -> &SharedColumn {
        &self.view
    }

    /// The handle this column registers with the gallery.
    pub fn handle(&self) -> Rc<dyn VirtualizerHandle> {
        Rc::new(self.view.clone())
    }

    /// First item in view and how far into it the viewport starts.
    pub fn anchor(&self) -> ScrollAnchor {
        self.view.view().anchor()
    }

    /// Snapshot for the scroll cache.
    pub fn state(&self, page_offset: f32) -> VirtualizationState {
        let view = self.view.view();
        VirtualizationState {
            visible_start_index: view.find_visible_start_index(),
            viewport_offset: page_offset,
            layout_cache: view.export_cache(),
            item_count: self.items.len(),
        }
    }

    /// Follow the page scroll. Returns the rendered window if it changed
    /// since the last announcement.
    pub fn sync(
        &mut self,
        page_offset: f32,
        viewport_height: f32,
        records: &[ImageRecord],
        column_width: f32,
        measurer: &dyn Measurer,
    ) -> Option<Range<usize>> {
        self.view.view_mut().set_viewport(page_offset, viewport_height);
        self.measure_rendered(records, column_width, measurer);
        self.take_announcement()
    }

    /// Apply saved state: seed measurements, then jump to the saved index.
    /// Measurements taken at another column width are dropped; the index
    /// still applies.
    pub fn restore(
        &mut self,
        state: &VirtualizationState,
        viewport_height: f32,
        records: &[ImageRecord],
        column_width: f32,
        measurer: &dyn Measurer,
    ) -> Option<Range<usize>> {
        {
            let mut view = self.view.view_mut();
            view.set_viewport(0.0, viewport_height);
            if view.import_cache(&state.layout_cache) == 0 && !state.layout_cache.is_empty() {
                tracing::debug!(
                    column = %self.id,
                    "saved measurements are for another column width; re-measuring"
                );
            }
        }
        self.view
            .scroll_to_index(state.visible_start_index, tessella::ScrollBehavior::Auto);
        self.measure_rendered(records, column_width, measurer);
        self.take_announcement()
    }

    fn measure_rendered(&self, records: &[ImageRecord], column_width: f32, measurer: &dyn Measurer) {
        let mut view = self.view.view_mut();
        for _ in 0..MAX_MEASURE_PASSES {
            let pending: Vec<usize> = view
                .visible_range()
                .filter(|&index| !view.cache().is_measured(index))
                .collect();
            if pending.is_empty() {
                break;
            }
            for index in pending {
                let Some(record) = self.items.get(index).and_then(|&i| records.get(i)) else {
                    continue;
                };
                view.record_measurement(index, measurer.measure(record, column_width));
            }
        }
    }

    fn take_announcement(&mut self) -> Option<Range<usize>> {
        let range = self.view.view().visible_range();
        if range == self.announced {
            return None;
        }
        self.announced = range.clone();
        Some(range)
    }
}

/// Live-region text for a column's rendered window.
pub fn announcement(slot: usize, range: &Range<usize>, total: usize) -> String {
    if range.is_empty() {
        format!("Column {}: no images shown of {}", slot + 1, total)
    } else {
        format!(
            "Column {}: showing images {} to {} of {}",
            slot + 1,
            range.start + 1,
            range.end,
            total
        )
    }
}
