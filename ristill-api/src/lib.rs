//! Ristill API - Shared types for the materials gallery.
//!
//! Everything here is plain data: dataset records, column and route
//! identifiers, the persisted virtualization state, and the events the
//! gallery publishes to subscribers.

mod event;
mod record;
mod route;
mod snapshot;

pub use event::*;
pub use record::*;
pub use route::*;
pub use snapshot::*;
