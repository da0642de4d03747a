//! Events published by the gallery to subscribers (live regions, logs, tests).

use serde::{Deserialize, Serialize};

use crate::{ColumnId, ScrollAnchor};

/// Events emitted by a mounted gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GalleryEvent {
    /// The rendered window of a column changed. `first`/`last` are 1-based,
    /// relative to the column and include overscan, for screen-reader
    /// announcements. `anchor` is the first item actually in view.
    VisibleRangeChanged {
        column: ColumnId,
        first: usize,
        last: usize,
        total: usize,
        anchor: ScrollAnchor,
    },

    /// Column count or width changed and columns were rebuilt.
    LayoutChanged {
        column_count: usize,
        column_width: f32,
    },

    /// A column's state was written to the persistence stores.
    StateSaved {
        column: ColumnId,
        visible_start_index: usize,
    },

    /// A saved state was applied to a freshly mounted column.
    StateRestored {
        column: ColumnId,
        visible_start_index: usize,
    },

    /// The page scroll offset was restored after columns repositioned.
    PageScrollRestored { offset: f32 },

    /// Saved scroll state was discarded (scroll-to-top).
    CacheCleared,
}
