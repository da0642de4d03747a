//! Column virtualization.
//!
//! `MeasurementCache` tracks estimated and measured item heights with O(log n)
//! offset queries; `ColumnVirtualizer` turns a scroll position into the window
//! of items that must actually be rendered.

mod cache;
mod column_view;

pub use cache::MeasurementCache;
pub use column_view::{
    ColumnLayout, ColumnVirtualizer, MeasureState, Placement, DEFAULT_OVERSCAN,
};
