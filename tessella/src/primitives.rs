//! Geometry types for Tessella.
//!
//! Page coordinates: x grows right from the gallery's left edge, y grows down
//! from the gallery's top edge.

use serde::{Deserialize, Serialize};

/// Viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Where a tile sits on the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether this rect overlaps the vertical band `[top, bottom)`.
    #[inline]
    pub fn intersects_band(&self, top: f32, bottom: f32) -> bool {
        self.y < bottom && self.bottom() > top
    }
}
