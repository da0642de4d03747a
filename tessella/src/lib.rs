//! Tessella: masonry layout engine for the materials gallery.
//!
//! Pure layout math with no I/O:
//! - `breakpoints`: viewport width -> column count, widths, gaps, height estimate
//! - `balancer`: greedy shortest-column assignment of images to columns
//! - `layout`: per-column measurement cache and virtualized window
//! - `scroll_state`: the shared page scroll position
//!
//! # Usage
//!
//! ```ignore
//! let resolved = LayoutPolicy::default().resolve(1280.0);
//! let columns = balancer::assign(&records, resolved.column_count, resolved.column_width, resolved.row_gap);
//! let mut view = ColumnVirtualizer::new(columns[0].len(), resolved.estimated_item_height, resolved.row_gap);
//! view.set_viewport(scroll_offset, viewport_height);
//! ```

// Core primitives
pub mod primitives;

// Layout policy and column assignment
pub mod balancer;
pub mod breakpoints;

// Virtualization (measurement cache + visible window)
pub mod layout;

// State helpers
pub mod scroll_state;

// Re-export core types
pub use balancer::{ColumnAssignment, assign, estimated_height};
pub use breakpoints::{Breakpoint, BreakpointName, LayoutError, LayoutPolicy, ResolvedLayout};
pub use layout::{
    ColumnLayout, ColumnVirtualizer, MeasureState, MeasurementCache, Placement, DEFAULT_OVERSCAN,
};
pub use primitives::{Rect, Size};
pub use scroll_state::{PageScroll, ScrollAction, ScrollBehavior};
