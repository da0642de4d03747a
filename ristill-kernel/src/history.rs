//! Navigation history with per-entry state.
//!
//! Each entry carries its own key-value state, like browser history state:
//! it comes back on back/forward navigation and starts empty on a fresh push.
//! [`HistoryHandle`] is the shared handle the app navigates with and the
//! scroll cache writes through.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ristill_api::Route;

use crate::error::StorageError;
use crate::persistence::KeyValueStore;

#[derive(Debug, Clone, PartialEq)]
struct HistoryEntry {
    route: Route,
    state: HashMap<String, String>,
}

impl HistoryEntry {
    fn new(route: Route) -> Self {
        Self {
            route,
            state: HashMap::new(),
        }
    }
}

/// Entries plus a cursor. Pushing drops everything after the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl HistoryStack {
    pub fn new(initial: Route) -> Self {
        Self {
            entries: vec![HistoryEntry::new(initial)],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &Route {
        &self.entries[self.cursor].route
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn push(&mut self, route: Route) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry::new(route));
        self.cursor = self.entries.len() - 1;
    }

    pub fn back(&mut self) -> Option<&Route> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&Route> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    fn state(&self) -> &HashMap<String, String> {
        &self.entries[self.cursor].state
    }

    fn state_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.entries[self.cursor].state
    }
}

/// Shared, cloneable handle to one history stack.
#[derive(Debug, Clone)]
pub struct HistoryHandle(Rc<RefCell<HistoryStack>>);

impl HistoryHandle {
    pub fn new(initial: Route) -> Self {
        Self(Rc::new(RefCell::new(HistoryStack::new(initial))))
    }

    pub fn current_route(&self) -> Route {
        self.0.borrow().current().clone()
    }

    pub fn push(&self, route: Route) {
        self.0.borrow_mut().push(route);
    }

    pub fn can_go_back(&self) -> bool {
        self.0.borrow().can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.0.borrow().can_go_forward()
    }

    /// Go back one entry. Returns the route now current.
    pub fn back(&self) -> Option<Route> {
        self.0.borrow_mut().back().cloned()
    }

    /// Go forward one entry. Returns the route now current.
    pub fn forward(&self) -> Option<Route> {
        self.0.borrow_mut().forward().cloned()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Reads and writes the state of the current entry.
impl KeyValueStore for HistoryHandle {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.0.borrow().state().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0
            .borrow_mut()
            .state_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.0.borrow_mut().state_mut().remove(key);
        Ok(())
    }
}
