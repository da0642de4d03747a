//! Ristill Kernel - data and persistence behind the materials gallery.
//!
//! This crate contains:
//! - The read-only materials dataset (load + validation)
//! - Key-value storage ports (memory, SQLite session, navigation history)
//! - The scroll/layout cache with expiry and item-count validation
//! - Detail routing and related materials
//! - The image-serving collaborator interface

pub mod clock;
pub mod history;
pub mod image_service;
pub mod persistence;
pub mod routing;
pub mod scroll_cache;
pub mod store;

mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{GalleryError, StorageError};
pub use history::{HistoryHandle, HistoryStack};
pub use image_service::{ImageService, OptimizerEndpoint};
pub use persistence::{KeyValueStore, MemoryStore, SqliteStore};
pub use routing::{DetailView, NavKey, related};
pub use scroll_cache::{ClearScope, PageRestoration, ScrollCache};
pub use store::MaterialStore;
