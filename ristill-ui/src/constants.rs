//! Shared constants for the Ristill gallery.
//!
//! Single source of truth for the defaults `GalleryConfig` falls back to.

/// Quiet period after the last scroll event before column state is saved.
pub const SCROLL_SETTLE_MS: i64 = 150;

/// Animation frames to wait before restoring the page offset. The first
/// frame lets the virtualizers reposition, the second sees their layout.
pub const RESTORE_FRAME_DELAY: u8 = 2;

/// Page offset past which the floating scroll-to-top button shows.
pub const TOP_BUTTON_THRESHOLD: f32 = 300.0;

/// Quality hint passed to the image optimizer.
pub const DEFAULT_IMAGE_QUALITY: u8 = 75;

/// Blur level of placeholder images.
pub const DEFAULT_PLACEHOLDER_BLUR: u8 = 10;

/// Image optimizer endpoint.
pub const DEFAULT_OPTIMIZER_URL: &str = "/_image";

/// Rendered height of the caption under each image.
pub const DEFAULT_CAPTION_HEIGHT: f32 = 44.0;

/// Broadcast channel capacity for gallery events.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Viewport used when none is given (a common laptop window).
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 800.0;
