//! Ownership transfer - hand one boxed native value to the foreign runtime
//!
//! Sequence:
//! 1. Wrap the value in an exclusive guard (destroys on any early exit)
//! 2. Let the runtime adopt the raw pointer
//! 3. Release the guard without destroying, only once adoption succeeded

use crate::errors::TransferFailure;
use crate::marshal::ForeignRuntime;
use core::marker::PhantomData;
use core::ptr::NonNull;
use tracing::{trace, warn};

/// Exclusive owner of a heap value
///
/// Destroys the value on drop unless `release` was called.
pub struct OwnedGuard<T> {
    ptr: NonNull<T>,
    _owns: PhantomData<T>,
}

impl<T> OwnedGuard<T> {
    pub fn new(value: Box<T>) -> Self {
        Self {
            ptr: NonNull::from(Box::leak(value)),
            _owns: PhantomData,
        }
    }

    /// Raw pointer to the guarded value; ownership stays with the guard
    #[inline]
    pub fn as_ptr(&self) -> NonNull<T> {
        self.ptr
    }

    #[inline]
    pub fn get(&self) -> &T {
        unsafe { self.ptr.as_ref() }
    }

    /// Give up ownership without destroying the value
    #[must_use = "the released pointer is no longer freed by anyone but its new owner"]
    pub fn release(self) -> NonNull<T> {
        let ptr = self.ptr;
        core::mem::forget(self);
        ptr
    }
}

impl<T> Drop for OwnedGuard<T> {
    fn drop(&mut self) {
        // Sole owner until released
        unsafe { drop(Box::from_raw(self.ptr.as_ptr())) }
    }
}

/// Make the foreign runtime the sole owner of `value`.
///
/// Whatever the outcome, the value is destroyed exactly once: by the runtime
/// after success, or by the guard before the error is returned.
pub fn transfer<R, T>(runtime: &R, value: Box<T>) -> Result<R::Object, TransferFailure>
where
    R: ForeignRuntime,
    T: Send + Sync + 'static,
{
    let guard = OwnedGuard::new(value);

    // The guard still owns the value if adoption fails
    let object = unsafe { runtime.adopt(guard.as_ptr()) }.map_err(|err| {
        warn!(event = "transfer_failed", type_name = core::any::type_name::<T>(), error = %err);
        err
    })?;

    let _ = guard.release();
    trace!(event = "transfer", type_name = core::any::type_name::<T>());
    Ok(object)
}
