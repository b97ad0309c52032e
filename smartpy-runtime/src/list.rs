//! List type - shared, growable sequence of objects
//!
//! Design: reference counted handle around a locked vector
//! - Cloning the handle shares the list (aliasing like the host language)
//! - Appends are amortized O(1)
//! - Elements stay alive as long as the list holds them

use crate::heap::Slot;
use crate::objects::Object;
use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;

struct ListCell {
    items: Mutex<Vec<Object>>,
    slot: Slot,
}

/// List object handle
#[derive(Clone)]
pub struct List {
    inner: Arc<ListCell>,
}

impl List {
    pub(crate) fn new(slot: Slot, capacity: usize) -> Self {
        Self {
            inner: Arc::new(ListCell {
                items: Mutex::new(Vec::with_capacity(capacity)),
                slot,
            }),
        }
    }

    /// Heap id of this list
    #[inline]
    pub fn id(&self) -> u64 {
        self.inner.slot.id()
    }

    pub fn len(&self) -> usize {
        self.inner.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`; negative indices count from the end
    pub fn get(&self, index: isize) -> Option<Object> {
        let items = self.inner.items.lock();
        let idx = if index < 0 {
            items.len().checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        items.get(idx).cloned()
    }

    pub fn append(&self, value: Object) {
        self.inner.items.lock().push(value);
    }

    /// Copy of the current elements, in order
    pub fn snapshot(&self) -> Vec<Object> {
        self.inner.items.lock().clone()
    }

    /// Number of handles sharing this list
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &List) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.snapshot().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Heap, Object};

    #[test]
    fn test_list_creation() {
        let heap = Heap::new();
        let list = heap.new_list(8).unwrap();
        assert_eq!(list.len(), 0);
        assert!(list.is_empty());
    }

    #[test]
    fn test_list_append() {
        let heap = Heap::new();
        let list = heap.new_list(0).unwrap();
        list.append(Object::Int(42));
        list.append(Object::Int(100));

        assert_eq!(list.len(), 2);
        assert!(matches!(list.get(0), Some(Object::Int(42))));
        assert!(matches!(list.get(1), Some(Object::Int(100))));
        assert!(list.get(2).is_none());
    }

    #[test]
    fn test_list_negative_indexing() {
        let heap = Heap::new();
        let list = heap
            .list_from([Object::Int(1), Object::Int(2), Object::Int(3)])
            .unwrap();

        assert!(matches!(list.get(-1), Some(Object::Int(3))));
        assert!(matches!(list.get(-2), Some(Object::Int(2))));
        assert!(list.get(-4).is_none());
    }

    #[test]
    fn test_clone_shares_storage() {
        let heap = Heap::new();
        let list = heap.new_list(0).unwrap();
        let alias = list.clone();

        alias.append(Object::Bool(true));
        assert_eq!(list.len(), 1);
        assert!(list.ptr_eq(&alias));
        assert_eq!(list.ref_count(), 2);
    }

    #[test]
    fn test_debug_repr() {
        let heap = Heap::new();
        let list = heap
            .list_from([Object::Float(1.5), Object::str("a"), Object::None])
            .unwrap();
        assert_eq!(format!("{:?}", list), "[1.5, 'a', None]");
    }
}
