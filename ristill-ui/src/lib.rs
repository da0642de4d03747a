//! Ristill UI - the materials gallery and its app shell.
//!
//! Follows the Elm architecture: [`GalleryApp`] owns all state, a
//! [`GalleryMessage`] drives every change, and `view` produces a plain,
//! serializable description of what to show.
//!
//! # Module Organization
//!
//! - `app`: route handling and the update loop
//! - `gallery`: the virtualized masonry listing
//! - `config`: tunables, optionally loaded from JSON
//! - `constants`: defaults for the config
//! - `debounce`: clock-driven save timer

// Shared constants (no dependencies)
pub mod constants;

pub mod app;
pub mod config;
pub mod debounce;
pub mod gallery;

pub use app::{GalleryApp, GalleryMessage, View};
pub use config::GalleryConfig;
pub use gallery::{ColumnFrame, Gallery, GalleryContext, GalleryFrame, RenderedItem};
