//! Boxed records - copied onto the heap and adopted by the foreign runtime

use super::{FromForeign, ToForeign};
use crate::errors::{TransferFailure, TypeMismatch};
use crate::marshal::ForeignRuntime;
use crate::transfer::transfer;

/// Value type that crosses the boundary as an individually boxed object
pub trait BoxedRecord: Clone + Send + Sync + 'static {
    /// Name reported in conversion errors
    const TYPE_NAME: &'static str;
}

impl<R: ForeignRuntime, T: BoxedRecord> ToForeign<R> for T {
    fn marshal(&self, runtime: &R) -> Result<R::Object, TransferFailure> {
        transfer(runtime, Box::new(self.clone()))
    }
}

impl<R: ForeignRuntime, T: BoxedRecord> FromForeign<R> for T {
    fn unmarshal(runtime: &R, object: &R::Object) -> Result<Self, TypeMismatch> {
        runtime
            .adopted::<T>(object)
            .ok_or_else(|| TypeMismatch::new(T::TYPE_NAME, runtime.type_name(object)))
    }
}
