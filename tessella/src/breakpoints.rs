//! Responsive layout policy: viewport width -> column geometry.
//!
//! A breakpoint table ordered by ascending minimum width. The last breakpoint
//! whose minimum is <= the viewport width wins; widths below every threshold
//! use the smallest breakpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Height-to-width factor of an "average" dataset image.
///
/// Tuned from the corpus mix: roughly 60% 16:9 landscape (0.5625) and 40%
/// 9:16 portrait (1.778), weighted to 1.0487 and rounded up.
pub const DEFAULT_HEIGHT_FACTOR: f32 = 1.05;

/// Space reserved under each image for its caption.
pub const DEFAULT_CAPTION_PADDING: f32 = 50.0;

/// Narrowest column the policy will produce.
pub const MIN_COLUMN_WIDTH: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakpointName {
    Mobile,
    Tablet,
    Desktop,
    LargeDesktop,
}

/// One row of the breakpoint table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub name: BreakpointName,
    /// Inclusive lower bound of the viewport width.
    pub min_width: f32,
    pub columns: usize,
    /// Columns never grow wider than this.
    pub max_column_width: f32,
    pub column_gap: f32,
    pub row_gap: f32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("breakpoint table is empty")]
    EmptyTable,

    #[error("breakpoint {0:?} has zero columns")]
    ZeroColumns(BreakpointName),
}

/// Column geometry for one viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLayout {
    pub breakpoint: BreakpointName,
    pub column_count: usize,
    pub column_width: f32,
    pub column_gap: f32,
    pub row_gap: f32,
    /// Initial scroll-height guess for an unmeasured item. Never used for
    /// final placement.
    pub estimated_item_height: f32,
}

impl ResolvedLayout {
    /// Horizontal page offset of a column's left edge.
    pub fn column_x(&self, column: usize) -> f32 {
        column as f32 * (self.column_width + self.column_gap)
    }

    /// Total width occupied by all columns and the gaps between them.
    pub fn content_width(&self) -> f32 {
        let gaps = self.column_count.saturating_sub(1) as f32 * self.column_gap;
        self.column_count as f32 * self.column_width + gaps
    }
}

/// The breakpoint table plus the item-height estimate parameters.
///
/// Deserializing goes through [`LayoutPolicy::new`], so a table that would
/// not validate does not deserialize either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolicyFields")]
pub struct LayoutPolicy {
    breakpoints: Vec<Breakpoint>,
    height_factor: f32,
    caption_padding: f32,
}

#[derive(Deserialize)]
struct PolicyFields {
    breakpoints: Vec<Breakpoint>,
    height_factor: f32,
    caption_padding: f32,
}

impl TryFrom<PolicyFields> for LayoutPolicy {
    type Error = LayoutError;

    fn try_from(fields: PolicyFields) -> Result<Self, LayoutError> {
        Self::new(fields.breakpoints, fields.height_factor, fields.caption_padding)
    }
}

impl LayoutPolicy {
    /// Build a policy from a breakpoint table (any order).
    pub fn new(
        mut breakpoints: Vec<Breakpoint>,
        height_factor: f32,
        caption_padding: f32,
    ) -> Result<Self, LayoutError> {
        if breakpoints.is_empty() {
            return Err(LayoutError::EmptyTable);
        }
        if let Some(bad) = breakpoints.iter().find(|b| b.columns == 0) {
            return Err(LayoutError::ZeroColumns(bad.name));
        }
        breakpoints.sort_by(|a, b| a.min_width.total_cmp(&b.min_width));
        Ok(Self {
            breakpoints,
            height_factor,
            caption_padding,
        })
    }

    /// The standard table: mobile < 640, tablet 640-1023, desktop 1024-1439,
    /// large desktop >= 1440.
    pub fn standard_breakpoints() -> Vec<Breakpoint> {
        vec![
            Breakpoint {
                name: BreakpointName::Mobile,
                min_width: 0.0,
                columns: 2,
                max_column_width: 280.0,
                column_gap: 16.0,
                row_gap: 16.0,
            },
            Breakpoint {
                name: BreakpointName::Tablet,
                min_width: 640.0,
                columns: 3,
                max_column_width: 280.0,
                column_gap: 20.0,
                row_gap: 20.0,
            },
            Breakpoint {
                name: BreakpointName::Desktop,
                min_width: 1024.0,
                columns: 4,
                max_column_width: 240.0,
                column_gap: 24.0,
                row_gap: 24.0,
            },
            Breakpoint {
                name: BreakpointName::LargeDesktop,
                min_width: 1440.0,
                columns: 4,
                max_column_width: 280.0,
                column_gap: 32.0,
                row_gap: 32.0,
            },
        ]
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Select the breakpoint for a viewport width.
    pub fn breakpoint_for(&self, viewport_width: f32) -> &Breakpoint {
        let width = if viewport_width.is_finite() { viewport_width } else { 0.0 };
        self.breakpoints
            .iter()
            .rev()
            .find(|b| b.min_width <= width)
            .unwrap_or(&self.breakpoints[0])
    }

    /// Resolve column geometry for a viewport width.
    pub fn resolve(&self, viewport_width: f32) -> ResolvedLayout {
        let bp = self.breakpoint_for(viewport_width);
        let width = if viewport_width.is_finite() {
            viewport_width.max(0.0)
        } else {
            0.0
        };

        let gaps = bp.column_gap * bp.columns.saturating_sub(1) as f32;
        let column_width = ((width - gaps) / bp.columns as f32)
            .min(bp.max_column_width)
            .max(MIN_COLUMN_WIDTH)
            .floor();

        ResolvedLayout {
            breakpoint: bp.name,
            column_count: bp.columns,
            column_width,
            column_gap: bp.column_gap,
            row_gap: bp.row_gap,
            estimated_item_height: self.estimate_item_height(column_width),
        }
    }

    /// Placeholder height for an item in a column of `column_width` pixels.
    pub fn estimate_item_height(&self, column_width: f32) -> f32 {
        (column_width * self.height_factor + self.caption_padding).round()
    }
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            breakpoints: Self::standard_breakpoints(),
            height_factor: DEFAULT_HEIGHT_FACTOR,
            caption_padding: DEFAULT_CAPTION_PADDING,
        }
    }
}
