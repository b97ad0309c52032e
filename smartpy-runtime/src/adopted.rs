//! Adopted native values - owned pointers with a deletion hook
//!
//! A native value handed over to the runtime is stored type-erased next to
//! the hook that knows how to destroy it. The hook runs exactly once, when
//! the `Adopted` cell is dropped.

use core::any::TypeId;
use core::fmt;
use core::ptr::NonNull;
use tracing::trace;

/// Static description of an adopted type
#[derive(Clone, Copy)]
pub struct TypeInfo {
    name: &'static str,
    type_id: TypeId,
    drop: unsafe fn(NonNull<u8>),
}

impl TypeInfo {
    pub fn of<T: 'static>() -> Self {
        Self {
            name: core::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            drop: drop_boxed::<T>,
        }
    }

    /// Fully qualified Rust type name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without module path or generic arguments
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeInfo").field(&self.name).finish()
    }
}

unsafe fn drop_boxed<T>(ptr: NonNull<u8>) {
    drop(Box::from_raw(ptr.cast::<T>().as_ptr()));
}

/// Exclusively owned, type-erased native value
pub struct Adopted {
    ptr: NonNull<u8>,
    type_info: TypeInfo,
}

// Only constructed from `T: Send + Sync`
unsafe impl Send for Adopted {}
unsafe impl Sync for Adopted {}

impl Adopted {
    /// Take ownership of a boxed value.
    ///
    /// # Safety
    /// `raw` must come from `Box::<T>::into_raw` (or `Box::leak`), and the
    /// caller must not use or free it afterwards.
    pub unsafe fn from_raw<T: Send + Sync + 'static>(raw: NonNull<T>) -> Self {
        Self {
            ptr: raw.cast(),
            type_info: TypeInfo::of::<T>(),
        }
    }

    #[inline]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_info.type_id == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if self.is::<T>() {
            // Type checked above; the pointee lives as long as `self`
            Some(unsafe { self.ptr.cast::<T>().as_ref() })
        } else {
            None
        }
    }
}

impl Drop for Adopted {
    fn drop(&mut self) {
        trace!(event = "adopted_destroy", type_name = self.type_info.short_name());
        unsafe { (self.type_info.drop)(self.ptr) }
    }
}

impl fmt::Debug for Adopted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} at {:p}>", self.type_info.short_name(), self.ptr)
    }
}
