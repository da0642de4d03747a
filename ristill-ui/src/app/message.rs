//! Messages that drive the gallery app update loop.

use ristill_api::Route;
use ristill_kernel::NavKey;
use tessella::ScrollAction;

#[derive(Debug, Clone, PartialEq)]
pub enum GalleryMessage {
    // Navigation
    Navigate(Route),
    Back,
    Forward,
    Key(NavKey),

    // Page events
    Scroll(ScrollAction),
    Resize { width: f32, height: f32 },
    VisibilityHidden,

    // Scheduling
    Tick,
    AnimationFrame,

    // Imperative handle
    ScrollToTop,
}
