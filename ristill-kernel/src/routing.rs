//! Detail-view routing: record lookup, prev/next, keyboard navigation and
//! related materials.

use ristill_api::{ImageRecord, RecordId, Route};
use serde::Serialize;

use crate::error::GalleryError;
use crate::store::MaterialStore;

/// Number of related materials shown under a detail view.
pub const DEFAULT_RELATED_COUNT: usize = 25;

/// Keys the detail view reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowLeft,
    ArrowRight,
    Escape,
}

impl NavKey {
    /// Map a DOM-style key name (`"ArrowLeft"`, `"Escape"`, ...).
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" => Some(NavKey::ArrowLeft),
            "ArrowRight" => Some(NavKey::ArrowRight),
            "Escape" | "Esc" => Some(NavKey::Escape),
            _ => None,
        }
    }
}

/// A resolved detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView<'a> {
    pub record: &'a ImageRecord,
    /// 1-based position in the dataset.
    pub position: usize,
    pub total: usize,
    pub previous: Option<RecordId>,
    pub next: Option<RecordId>,
}

impl<'a> DetailView<'a> {
    /// Look up `id`. An unknown id is the page-level "not found".
    pub fn resolve(store: &'a MaterialStore, id: &RecordId) -> Result<Self, GalleryError> {
        let index = store
            .position(id)
            .ok_or_else(|| GalleryError::NotFound(id.clone()))?;
        let record = &store.records()[index];
        let previous = index
            .checked_sub(1)
            .and_then(|i| store.get_index(i))
            .map(|r| r.id.clone());
        let next = store.get_index(index + 1).map(|r| r.id.clone());

        Ok(Self {
            record,
            position: index + 1,
            total: store.len(),
            previous,
            next,
        })
    }

    /// Position label, e.g. `"12 / 340"`.
    pub fn position_label(&self) -> String {
        format!("{} / {}", self.position, self.total)
    }

    /// Where a key press leads. `None` means stay.
    pub fn route_for(&self, key: NavKey) -> Option<Route> {
        match key {
            NavKey::ArrowLeft => self.previous.clone().map(Route::Detail),
            NavKey::ArrowRight => self.next.clone().map(Route::Detail),
            NavKey::Escape => Some(Route::Listing),
        }
    }
}

/// Up to `count` records following `id` in dataset order, wrapping around
/// and never including `id` itself. An unknown id yields the first `count`.
pub fn related<'a>(store: &'a MaterialStore, id: &RecordId, count: usize) -> Vec<&'a ImageRecord> {
    let records = store.records();
    let Some(current) = store.position(id) else {
        return records.iter().take(count).collect();
    };

    let total = records.len();
    (1..total)
        .map(|step| &records[(current + step) % total])
        .take(count)
        .collect()
}
