//! Registry of mounted column virtualizers.
//!
//! Columns register a handle when they mount and deregister (register with
//! `None`) when they unmount, so the gallery can drive every live column
//! without holding on to ones that are gone.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use ristill_api::{CacheSnapshot, ColumnId};
use tessella::{ColumnVirtualizer, ScrollBehavior};

/// What the gallery may do to a mounted column.
pub trait VirtualizerHandle {
    /// Returns the column-relative offset the column moved to.
    fn scroll_to_index(&self, index: usize, behavior: ScrollBehavior) -> f32;
    fn current_cache(&self) -> CacheSnapshot;
    fn find_visible_start_index(&self) -> usize;
}

/// A column virtualizer shared between its column and the registry.
#[derive(Debug, Clone)]
pub struct SharedColumn(Rc<RefCell<ColumnVirtualizer>>);

impl SharedColumn {
    pub fn new(view: ColumnVirtualizer) -> Self {
        Self(Rc::new(RefCell::new(view)))
    }

    pub fn view(&self) -> std::cell::Ref<'_, ColumnVirtualizer> {
        self.0.borrow()
    }

    pub fn view_mut(&self) -> std::cell::RefMut<'_, ColumnVirtualizer> {
        self.0.borrow_mut()
    }
}

impl VirtualizerHandle for SharedColumn {
    fn scroll_to_index(&self, index: usize, behavior: ScrollBehavior) -> f32 {
        let offset = self.0.borrow_mut().scroll_to_index(index);
        tracing::trace!(index, offset, ?behavior, "column scrolled to index");
        offset
    }

    fn current_cache(&self) -> CacheSnapshot {
        self.0.borrow().export_cache()
    }

    fn find_visible_start_index(&self) -> usize {
        self.0.borrow().find_visible_start_index()
    }
}

#[derive(Default)]
pub struct VirtualizerRegistry {
    handles: BTreeMap<ColumnId, Rc<dyn VirtualizerHandle>>,
}

impl VirtualizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a column's handle, or remove it with `None`.
    pub fn register(&mut self, id: ColumnId, handle: Option<Rc<dyn VirtualizerHandle>>) {
        match handle {
            Some(handle) => {
                self.handles.insert(id, handle);
            }
            None => {
                self.handles.remove(&id);
            }
        }
    }

    pub fn get(&self, id: &ColumnId) -> Option<&Rc<dyn VirtualizerHandle>> {
        self.handles.get(id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnId, &Rc<dyn VirtualizerHandle>)> {
        self.handles.iter()
    }
}
