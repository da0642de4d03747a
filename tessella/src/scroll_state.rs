//! Page Scroll State
//!
//! The outer page's scroll offset. Column virtualizers keep their own
//! column-relative offsets; this is the single document-level coordinate
//! they are derived from.

use serde::Serialize;

/// How a programmatic scroll should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    #[default]
    Auto,
    Smooth,
}

/// An action on the page scroll, produced by event handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollAction {
    /// Scroll by a delta (positive = towards the end of the page).
    ScrollBy(f32),
    /// Jump to an absolute offset.
    ScrollTo { offset: f32, behavior: ScrollBehavior },
}

/// Scroll state of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageScroll {
    /// Current scroll offset (0 = top).
    offset: f32,
    /// Maximum scroll offset. Unbounded until content height is known.
    max: f32,
    viewport_height: f32,
    /// Behavior of the last programmatic scroll.
    last_behavior: ScrollBehavior,
}

impl Default for PageScroll {
    fn default() -> Self {
        Self::new()
    }
}

impl PageScroll {
    pub fn new() -> Self {
        Self {
            offset: 0.0,
            max: f32::MAX,
            viewport_height: 0.0,
            last_behavior: ScrollBehavior::Auto,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn last_behavior(&self) -> ScrollBehavior {
        self.last_behavior
    }

    // =====================================================================
    // Scroll operations
    // =====================================================================

    /// Apply a scroll action (call from update()).
    pub fn apply(&mut self, action: ScrollAction) {
        match action {
            ScrollAction::ScrollBy(delta) => self.scroll_by(delta),
            ScrollAction::ScrollTo { offset, behavior } => self.scroll_to(offset, behavior),
        }
    }

    pub fn scroll_by(&mut self, delta: f32) {
        if delta.is_finite() {
            self.offset = (self.offset + delta).clamp(0.0, self.max);
        }
    }

    pub fn scroll_to(&mut self, offset: f32, behavior: ScrollBehavior) {
        let offset = if offset.is_finite() { offset } else { 0.0 };
        self.offset = offset.clamp(0.0, self.max);
        self.last_behavior = behavior;
    }

    // =====================================================================
    // Geometry
    // =====================================================================

    /// Update the scrollable range from the tallest column. The offset is
    /// re-clamped if the content shrank.
    pub fn set_content_height(&mut self, content_height: f32) {
        let content = if content_height.is_finite() { content_height.max(0.0) } else { 0.0 };
        self.max = (content - self.viewport_height).max(0.0);
        self.offset = self.offset.clamp(0.0, self.max);
    }

    pub fn set_viewport_height(&mut self, viewport_height: f32) {
        self.viewport_height = if viewport_height.is_finite() {
            viewport_height.max(0.0)
        } else {
            0.0
        };
    }
}
