//! Heap registry - allocation budget and live object tracking
//!
//! Design: every list and adopted record takes a slot from the heap when it
//! is created and hands it back when its last reference goes away:
//! - Lock-free slot accounting (atomics)
//! - Optional budget on simultaneously live objects
//! - Concurrent registry of live records for diagnostics

use crate::adopted::Adopted;
use crate::list::List;
use crate::objects::{Object, Record};
use core::fmt;
use core::ptr::NonNull;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Heap configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeapConfig {
    /// Maximum number of simultaneously live heap objects (`None` = unbounded)
    pub max_objects: Option<usize>,
}

impl HeapConfig {
    pub fn bounded(max_objects: usize) -> Self {
        Self {
            max_objects: Some(max_objects),
        }
    }
}

/// Allocation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The live object budget is used up
    Exhausted { limit: usize },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { limit } => {
                write!(f, "heap exhausted: {} live objects allowed", limit)
            }
        }
    }
}

impl std::error::Error for AllocError {}

/// Snapshot of heap counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    pub live_objects: usize,
    pub live_records: usize,
    pub allocations: u64,
    pub failures: u64,
}

pub(crate) struct HeapInner {
    config: HeapConfig,
    live: AtomicUsize,
    next_id: AtomicU64,
    allocations: AtomicU64,
    failures: AtomicU64,
    records: DashMap<u64, &'static str>,
}

/// Shared handle to the object heap
///
/// Cloning is cheap; all clones account against the same budget.
#[derive(Clone)]
pub struct Heap {
    inner: Arc<HeapInner>,
}

impl Heap {
    /// Unbounded heap
    pub fn new() -> Self {
        Self::with_config(HeapConfig::default())
    }

    pub fn with_config(config: HeapConfig) -> Self {
        debug!(max_objects = ?config.max_objects, "Heap created");

        Self {
            inner: Arc::new(HeapInner {
                config,
                live: AtomicUsize::new(0),
                next_id: AtomicU64::new(1),
                allocations: AtomicU64::new(0),
                failures: AtomicU64::new(0),
                records: DashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &HeapConfig {
        &self.inner.config
    }

    pub fn stats(&self) -> HeapStats {
        HeapStats {
            live_objects: self.inner.live.load(Ordering::Acquire),
            live_records: self.inner.records.len(),
            allocations: self.inner.allocations.load(Ordering::Relaxed),
            failures: self.inner.failures.load(Ordering::Relaxed),
        }
    }

    /// Live records as `(id, type name)`, oldest first
    pub fn live_records(&self) -> Vec<(u64, &'static str)> {
        let mut records: Vec<_> = self
            .inner
            .records
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        records.sort_unstable_by_key(|(id, _)| *id);
        records
    }

    /// Create an empty list
    pub fn new_list(&self, capacity: usize) -> Result<List, AllocError> {
        let slot = self.allocate()?;
        trace!(event = "list_new", id = slot.id(), capacity);
        Ok(List::new(slot, capacity))
    }

    /// Create a list holding `items` in order
    pub fn list_from(&self, items: impl IntoIterator<Item = Object>) -> Result<List, AllocError> {
        let items = items.into_iter();
        let list = self.new_list(items.size_hint().0)?;
        for item in items {
            list.append(item);
        }
        Ok(list)
    }

    /// Adopt a boxed native value as a record object.
    ///
    /// On `Ok` the heap owns the pointee and destroys it exactly once, when
    /// the last reference to the record is dropped. On `Err` nothing has
    /// been taken over and the caller still owns `raw`.
    ///
    /// # Safety
    /// `raw` must come from `Box::<T>::into_raw` (or `Box::leak`) and must
    /// not be used or freed by the caller once this returns `Ok`.
    pub unsafe fn adopt<T: Send + Sync + 'static>(&self, raw: NonNull<T>) -> Result<Record, AllocError> {
        let slot = self.allocate()?;
        let value = Adopted::from_raw(raw);

        self.inner.records.insert(slot.id(), value.type_info().short_name());
        trace!(event = "record_adopt", id = slot.id(), type_name = value.type_info().short_name());

        Ok(Record::new(slot, value))
    }

    /// Reserve one object slot, respecting the budget
    fn allocate(&self) -> Result<Slot, AllocError> {
        let limit = self.inner.config.max_objects;
        let reserved = self
            .inner
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| match limit {
                Some(max) if live >= max => None,
                _ => Some(live + 1),
            });

        if let Err(live) = reserved {
            self.inner.failures.fetch_add(1, Ordering::Relaxed);
            warn!(event = "heap_exhausted", live, "Allocation refused");
            return Err(AllocError::Exhausted {
                limit: limit.unwrap_or(live),
            });
        }

        self.inner.allocations.fetch_add(1, Ordering::Relaxed);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        Ok(Slot {
            id,
            heap: Arc::clone(&self.inner),
        })
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

/// One reserved object slot; released on drop
pub(crate) struct Slot {
    id: u64,
    heap: Arc<HeapInner>,
}

impl Slot {
    #[inline]
    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.heap.records.remove(&self.id);
        let old = self.heap.live.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(old > 0, "live object count underflow");
        trace!(event = "heap_release", id = self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_heap_counts_lists() {
        let heap = Heap::new();
        let a = heap.new_list(0).unwrap();
        let b = heap.new_list(4).unwrap();

        let stats = heap.stats();
        assert_eq!(stats.live_objects, 2);
        assert_eq!(stats.live_records, 0);
        assert_eq!(stats.allocations, 2);

        drop(a);
        drop(b);
        assert_eq!(heap.stats().live_objects, 0);
    }

    #[test]
    fn test_budget_refuses_allocation() {
        let heap = Heap::with_config(HeapConfig::bounded(1));
        let list = heap.new_list(0).unwrap();

        let err = heap.new_list(0).unwrap_err();
        assert_eq!(err, AllocError::Exhausted { limit: 1 });
        assert_eq!(heap.stats().failures, 1);

        // Slot comes back once the list is gone
        drop(list);
        assert!(heap.new_list(0).is_ok());
    }

    #[test]
    fn test_adopt_registers_record() {
        let heap = Heap::new();
        let raw = NonNull::from(Box::leak(Box::new(7u32)));

        let record = unsafe { heap.adopt(raw).unwrap() };
        assert_eq!(heap.stats().live_records, 1);
        assert_eq!(heap.live_records(), vec![(record.id(), "u32")]);
        assert_eq!(record.downcast_ref::<u32>(), Some(&7));

        drop(record);
        assert_eq!(heap.stats().live_records, 0);
        assert_eq!(heap.stats().live_objects, 0);
    }

    #[test]
    fn test_failed_adopt_leaves_ownership_with_caller() {
        let heap = Heap::with_config(HeapConfig::bounded(0));
        let raw = NonNull::from(Box::leak(Box::new(String::from("kept"))));

        assert!(unsafe { heap.adopt(raw) }.is_err());

        // Still ours to free
        let back = unsafe { Box::from_raw(raw.as_ptr()) };
        assert_eq!(*back, "kept");
    }

    #[test]
    fn test_alloc_error_display() {
        let err = AllocError::Exhausted { limit: 3 };
        assert_eq!(err.to_string(), "heap exhausted: 3 live objects allowed");
    }
}
