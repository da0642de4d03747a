//! Measuring rendered items.

use ristill_api::ImageRecord;

/// Reports the real rendered height of an item once it is on screen.
pub trait Measurer {
    fn measure(&self, record: &ImageRecord, column_width: f32) -> f32;
}

/// Height from intrinsic dimensions plus a fixed caption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntrinsicMeasure {
    pub caption_height: f32,
}

impl Measurer for IntrinsicMeasure {
    fn measure(&self, record: &ImageRecord, column_width: f32) -> f32 {
        (record.scaled_height(column_width) + self.caption_height).round()
    }
}
