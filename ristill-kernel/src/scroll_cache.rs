//! Scroll/layout cache - per-column virtualization state across navigation.
//!
//! Every save goes to two stores: the history entry (back/forward) and the
//! session (in-app links, where the new history entry starts empty). Loads
//! read the history entry first and fall back to the session.
//!
//! All operations are best-effort. Storage failures are logged in debug
//! builds and otherwise ignored; a stale or expired entry reads as absent.

use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, TimeDelta, Utc};
use ristill_api::{ColumnId, VirtualizationState};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::StorageError;
use crate::persistence::KeyValueStore;

/// Key of the multi-column blob. Bump the suffix when the stored shape
/// changes; entries under old keys are then never read.
pub const SCROLL_STATE_KEY: &str = "materials-grid-scroll-v3";

/// Key of the page-level restoration metadata.
pub const PAGE_STATE_KEY: &str = "materials-page-restoration";

/// Saved entries older than this many minutes are ignored.
pub const DEFAULT_EXPIRY_MINUTES: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredColumn {
    state: VirtualizationState,
    saved_at: DateTime<Utc>,
}

/// All columns of a gallery, keyed by column id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredGrid {
    columns: BTreeMap<String, StoredColumn>,
}

/// Page scroll offset saved alongside the column states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRestoration {
    pub offset: f32,
    pub saved_at: DateTime<Utc>,
}

/// What `clear` discards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearScope {
    Column(ColumnId),
    All,
}

/// Which backing store an operation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    History,
    Session,
}

pub struct ScrollCache {
    history: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    expiry: TimeDelta,
}

impl ScrollCache {
    pub fn new(
        history: Box<dyn KeyValueStore>,
        session: Box<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            history,
            session,
            clock,
            expiry: TimeDelta::minutes(DEFAULT_EXPIRY_MINUTES),
        }
    }

    pub fn with_expiry(mut self, expiry: TimeDelta) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn expiry(&self) -> TimeDelta {
        self.expiry
    }

    // =====================================================================
    // Column state
    // =====================================================================

    /// Write a column's state to both stores.
    pub fn save(&mut self, column: &ColumnId, state: &VirtualizationState) {
        let entry = StoredColumn {
            state: state.clone(),
            saved_at: self.clock.now(),
        };
        for scope in [Scope::History, Scope::Session] {
            let mut grid = self.read_grid(scope).unwrap_or_default();
            grid.columns.insert(column.as_str().to_string(), entry.clone());
            if let Err(e) = self.write_grid(scope, &grid) {
                report("save", scope, &e);
            }
        }
    }

    /// Read a column's state, history first, then session.
    ///
    /// Returns `None` unless an entry exists whose item count is exactly
    /// `item_count` and whose age is within the expiry window.
    pub fn load(&self, column: &ColumnId, item_count: usize) -> Option<VirtualizationState> {
        let now = self.clock.now();
        for scope in [Scope::History, Scope::Session] {
            let Some(grid) = self.read_grid(scope) else {
                continue;
            };
            let Some(entry) = grid.columns.get(column.as_str()) else {
                continue;
            };
            if entry.state.item_count != item_count {
                tracing::debug!(
                    %column,
                    stored = entry.state.item_count,
                    current = item_count,
                    ?scope,
                    "ignoring saved state: item count changed"
                );
                continue;
            }
            if self.is_expired(entry.saved_at, now) {
                tracing::debug!(%column, ?scope, "ignoring saved state: expired");
                continue;
            }
            return Some(entry.state.clone());
        }
        None
    }

    /// Discard saved state. Each key is removed independently; one failure
    /// does not keep the others.
    pub fn clear(&mut self, scope: &ClearScope) {
        for store_scope in [Scope::History, Scope::Session] {
            match scope {
                ClearScope::All => {
                    for key in [SCROLL_STATE_KEY, PAGE_STATE_KEY] {
                        if let Err(e) = self.store_mut(store_scope).remove(key) {
                            report("clear", store_scope, &e);
                        }
                    }
                }
                ClearScope::Column(column) => {
                    let Some(mut grid) = self.read_grid(store_scope) else {
                        continue;
                    };
                    if grid.columns.remove(column.as_str()).is_some() {
                        if let Err(e) = self.write_grid(store_scope, &grid) {
                            report("clear", store_scope, &e);
                        }
                    }
                }
            }
        }
    }

    // =====================================================================
    // Page state
    // =====================================================================

    pub fn save_page(&mut self, offset: f32) {
        let page = PageRestoration {
            offset,
            saved_at: self.clock.now(),
        };
        let json = match serde_json::to_string(&page) {
            Ok(json) => json,
            Err(e) => {
                report("save_page", Scope::Session, &StorageError::from(e));
                return;
            }
        };
        for scope in [Scope::History, Scope::Session] {
            if let Err(e) = self.store_mut(scope).set(PAGE_STATE_KEY, &json) {
                report("save_page", scope, &e);
            }
        }
    }

    /// The saved page offset, if present and not expired.
    pub fn load_page(&self) -> Option<f32> {
        let now = self.clock.now();
        [Scope::History, Scope::Session].into_iter().find_map(|scope| {
            let json = self.read_key(scope, PAGE_STATE_KEY)?;
            let page: PageRestoration = serde_json::from_str(&json).ok()?;
            (!self.is_expired(page.saved_at, now) && page.offset.is_finite()).then_some(page.offset)
        })
    }

    fn is_expired(&self, saved_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(saved_at) > self.expiry
    }

    fn store(&self, scope: Scope) -> &dyn KeyValueStore {
        match scope {
            Scope::History => self.history.as_ref(),
            Scope::Session => self.session.as_ref(),
        }
    }

    fn store_mut(&mut self, scope: Scope) -> &mut dyn KeyValueStore {
        match scope {
            Scope::History => self.history.as_mut(),
            Scope::Session => self.session.as_mut(),
        }
    }

    fn read_key(&self, scope: Scope, key: &str) -> Option<String> {
        match self.store(scope).get(key) {
            Ok(value) => value,
            Err(e) => {
                report("read", scope, &e);
                None
            }
        }
    }

    /// The stored grid, or `None` if missing or unreadable.
    fn read_grid(&self, scope: Scope) -> Option<StoredGrid> {
        let json = self.read_key(scope, SCROLL_STATE_KEY)?;
        match serde_json::from_str(&json) {
            Ok(grid) => Some(grid),
            Err(e) => {
                report("decode", scope, &StorageError::from(e));
                None
            }
        }
    }

    fn write_grid(&mut self, scope: Scope, grid: &StoredGrid) -> Result<(), StorageError> {
        let json = serde_json::to_string(grid)?;
        self.store_mut(scope).set(SCROLL_STATE_KEY, &json)
    }
}

/// Persistence failures are only worth noise while developing.
fn report(op: &str, scope: Scope, error: &StorageError) {
    if cfg!(debug_assertions) {
        tracing::debug!(op, ?scope, %error, "scroll cache storage failure");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::history::HistoryHandle;
    use crate::persistence::MemoryStore;
    use ristill_api::{CacheSnapshot, MeasuredItem, Route};

    fn state(item_count: usize, start: usize) -> VirtualizationState {
        VirtualizationState {
            visible_start_index: start,
            viewport_offset: 1234.0,
            layout_cache: CacheSnapshot {
                estimated_height: 302.0,
                measured: vec![MeasuredItem { index: 0, height: 280.0 }],
            },
            item_count,
        }
    }

    fn cache_with(history: MemoryStore, session: MemoryStore) -> (ScrollCache, ManualClock) {
        let clock = ManualClock::default();
        let cache = ScrollCache::new(Box::new(history), Box::new(session), Rc::new(clock.clone()));
        (cache, clock)
    }

    fn cache() -> (ScrollCache, ManualClock) {
        cache_with(MemoryStore::new(), MemoryStore::new())
    }

    /// A store that refuses to remove one key.
    struct StuckKey {
        inner: MemoryStore,
        stuck: &'static str,
    }

    impl KeyValueStore for StuckKey {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            if key == self.stuck {
                return Err(StorageError::Unavailable("locked".into()));
            }
            self.inner.remove(key)
        }
    }

    #[test]
    fn load_requires_exact_item_count() {
        let (mut cache, _) = cache();
        let column = ColumnId::for_index(0);
        cache.save(&column, &state(25, 4));

        assert_eq!(cache.load(&column, 24), None);
        assert_eq!(cache.load(&column, 26), None);
        assert_eq!(cache.load(&column, 25), Some(state(25, 4)));
    }

    #[test]
    fn entries_expire_after_thirty_minutes() {
        let (mut cache, clock) = cache();
        let column = ColumnId::for_index(1);
        cache.save(&column, &state(10, 2));

        clock.advance(TimeDelta::minutes(29));
        assert!(cache.load(&column, 10).is_some());

        clock.advance(TimeDelta::minutes(2));
        assert_eq!(cache.load(&column, 10), None);
    }

    #[test]
    fn columns_are_keyed_independently() {
        let (mut cache, _) = cache();
        cache.save(&ColumnId::for_index(0), &state(10, 1));
        cache.save(&ColumnId::for_index(1), &state(12, 3));

        assert_eq!(cache.load(&ColumnId::for_index(0), 10).map(|s| s.visible_start_index), Some(1));
        assert_eq!(cache.load(&ColumnId::for_index(1), 12).map(|s| s.visible_start_index), Some(3));
        assert_eq!(cache.load(&ColumnId::for_index(2), 10), None);
    }

    #[test]
    fn session_backs_up_a_fresh_history_entry() {
        let history = HistoryHandle::new(Route::Listing);
        let clock = ManualClock::default();
        let mut cache = ScrollCache::new(
            Box::new(history.clone()),
            Box::new(MemoryStore::new()),
            Rc::new(clock),
        );
        let column = ColumnId::for_index(0);
        cache.save(&column, &state(8, 5));

        // In-app link: new entry, empty history state.
        history.push(Route::detail("3"));
        history.push(Route::Listing);
        assert_eq!(cache.load(&column, 8).map(|s| s.visible_start_index), Some(5));
    }

    #[test]
    fn history_entry_wins_over_session() {
        let history = HistoryHandle::new(Route::Listing);
        let mut cache = ScrollCache::new(
            Box::new(history.clone()),
            Box::new(MemoryStore::new()),
            Rc::new(ManualClock::default()),
        );
        let column = ColumnId::for_index(0);
        cache.save(&column, &state(8, 5));
        history.push(Route::detail("1"));
        cache.save(&column, &state(8, 6));
        history.back();

        // History entry for the listing still holds the older state.
        assert_eq!(cache.load(&column, 8).map(|s| s.visible_start_index), Some(5));
    }

    #[test]
    fn stale_history_entry_falls_back_to_valid_session_entry() {
        let history = HistoryHandle::new(Route::Listing);
        let mut cache = ScrollCache::new(
            Box::new(history.clone()),
            Box::new(MemoryStore::new()),
            Rc::new(ManualClock::default()),
        );
        let column = ColumnId::for_index(0);
        cache.save(&column, &state(8, 5));
        history.push(Route::detail("1"));
        cache.save(&column, &state(9, 2));
        history.back();

        assert_eq!(cache.load(&column, 9).map(|s| s.visible_start_index), Some(2));
    }

    #[test]
    fn clear_all_discards_everything() {
        let (mut cache, _) = cache();
        cache.save(&ColumnId::for_index(0), &state(10, 1));
        cache.save(&ColumnId::for_index(1), &state(10, 1));
        cache.save_page(900.0);

        cache.clear(&ClearScope::All);
        assert_eq!(cache.load(&ColumnId::for_index(0), 10), None);
        assert_eq!(cache.load(&ColumnId::for_index(1), 10), None);
        assert_eq!(cache.load_page(), None);
    }

    #[test]
    fn clear_all_removes_page_key_when_column_key_is_stuck() {
        let history = StuckKey {
            inner: MemoryStore::new(),
            stuck: SCROLL_STATE_KEY,
        };
        let mut cache = ScrollCache::new(
            Box::new(history),
            Box::new(MemoryStore::new()),
            Rc::new(ManualClock::default()),
        );
        cache.save(&ColumnId::for_index(0), &state(10, 1));
        cache.save_page(900.0);

        cache.clear(&ClearScope::All);
        assert_eq!(cache.load_page(), None);
        // The stuck key survives in history only.
        assert!(cache.load(&ColumnId::for_index(0), 10).is_some());
    }

    #[test]
    fn clear_column_keeps_the_others() {
        let (mut cache, _) = cache();
        cache.save(&ColumnId::for_index(0), &state(10, 1));
        cache.save(&ColumnId::for_index(1), &state(10, 1));

        cache.clear(&ClearScope::Column(ColumnId::for_index(0)));
        assert_eq!(cache.load(&ColumnId::for_index(0), 10), None);
        assert!(cache.load(&ColumnId::for_index(1), 10).is_some());
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let (mut cache, _) = cache_with(MemoryStore::disabled(), MemoryStore::with_quota(16));
        let column = ColumnId::for_index(0);
        cache.save(&column, &state(10, 1));
        cache.save_page(10.0);
        cache.clear(&ClearScope::All);
        assert_eq!(cache.load(&column, 10), None);
    }

    #[test]
    fn quota_on_one_store_leaves_the_other() {
        let (mut cache, _) = cache_with(MemoryStore::with_quota(16), MemoryStore::new());
        let column = ColumnId::for_index(0);
        cache.save(&column, &state(10, 7));
        assert_eq!(cache.load(&column, 10).map(|s| s.visible_start_index), Some(7));
    }

    #[test]
    fn corrupt_blob_reads_as_absent() {
        let mut session = MemoryStore::new();
        session.set(SCROLL_STATE_KEY, "{\"columns\": 12}").unwrap();
        let (cache, _) = cache_with(MemoryStore::new(), session);
        assert_eq!(cache.load(&ColumnId::for_index(0), 1), None);
    }

    #[test]
    fn page_offset_expires_with_columns() {
        let (mut cache, clock) = cache();
        cache.save_page(4200.0);
        assert_eq!(cache.load_page(), Some(4200.0));
        clock.advance(TimeDelta::minutes(31));
        assert_eq!(cache.load_page(), None);
    }
}
