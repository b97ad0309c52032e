//! Foreign runtime seam
//!
//! The marshaller needs exactly three things from the runtime on the other
//! side: iteration, list construction/append, and adoption of a raw heap
//! pointer into a runtime-managed wrapper.

use crate::errors::{ConversionError, TransferFailure};
use core::ptr::NonNull;
use smartpy_runtime::{Heap, List, Object};

/// Elements produced by a foreign iterator; `Err` carries the runtime's message
pub type ForeignIter<'a, O> = Box<dyn Iterator<Item = Result<O, String>> + 'a>;

pub trait ForeignRuntime {
    type Object;
    type List;

    fn new_list(&self, capacity: usize) -> Result<Self::List, TransferFailure>;

    fn append(&self, list: &Self::List, item: Self::Object) -> Result<(), TransferFailure>;

    fn list_object(&self, list: Self::List) -> Self::Object;

    /// Dynamic type name of `object`, for error reports
    fn type_name(&self, object: &Self::Object) -> String;

    fn iter<'a>(
        &'a self,
        iterable: &'a Self::Object,
    ) -> Result<ForeignIter<'a, Self::Object>, ConversionError>;

    /// Hand a boxed value over to the runtime's memory management.
    ///
    /// On `Ok` the runtime destroys the pointee exactly once (as a `Box<T>`)
    /// when the last reference to the returned object goes away. On `Err`
    /// the runtime has taken nothing and the caller still owns `raw`.
    ///
    /// # Safety
    /// `raw` must come from `Box::<T>::into_raw` (or `Box::leak`) and be
    /// exclusively owned by the caller.
    unsafe fn adopt<T: Send + Sync + 'static>(
        &self,
        raw: NonNull<T>,
    ) -> Result<Self::Object, TransferFailure>;

    /// Copy of the adopted `T` behind `object`, if it wraps one
    fn adopted<T: Clone + 'static>(&self, object: &Self::Object) -> Option<T>;
}

impl ForeignRuntime for Heap {
    type Object = Object;
    type List = List;

    fn new_list(&self, capacity: usize) -> Result<List, TransferFailure> {
        Heap::new_list(self, capacity).map_err(TransferFailure::from)
    }

    fn append(&self, list: &List, item: Object) -> Result<(), TransferFailure> {
        list.append(item);
        Ok(())
    }

    fn list_object(&self, list: List) -> Object {
        Object::List(list)
    }

    fn type_name(&self, object: &Object) -> String {
        object.type_name().to_string()
    }

    fn iter<'a>(&'a self, iterable: &'a Object) -> Result<ForeignIter<'a, Object>, ConversionError> {
        match iterable.iter() {
            Some(items) => Ok(Box::new(items.map(Ok))),
            None => Err(ConversionError::NotIterable {
                found: iterable.type_name().to_string(),
            }),
        }
    }

    unsafe fn adopt<T: Send + Sync + 'static>(&self, raw: NonNull<T>) -> Result<Object, TransferFailure> {
        Heap::adopt(self, raw)
            .map(Object::Record)
            .map_err(TransferFailure::from)
    }

    fn adopted<T: Clone + 'static>(&self, object: &Object) -> Option<T> {
        object.as_record()?.downcast_ref::<T>().cloned()
    }
}
