//! Primitive conversions for the in-process runtime
//!
//! Numeric rules follow the host language: ints and bools widen to float,
//! bools count as ints, floats never narrow to int.

use super::{FromForeign, ToForeign};
use crate::errors::{TransferFailure, TypeMismatch};
use num_traits::ToPrimitive;
use smartpy_runtime::{Heap, Object};

impl ToForeign<Heap> for f64 {
    #[inline]
    fn marshal(&self, _runtime: &Heap) -> Result<Object, TransferFailure> {
        Ok(Object::Float(*self))
    }
}

impl ToForeign<Heap> for i32 {
    #[inline]
    fn marshal(&self, _runtime: &Heap) -> Result<Object, TransferFailure> {
        Ok(Object::Int(i64::from(*self)))
    }
}

impl ToForeign<Heap> for String {
    #[inline]
    fn marshal(&self, _runtime: &Heap) -> Result<Object, TransferFailure> {
        Ok(Object::str(self))
    }
}

impl FromForeign<Heap> for f64 {
    fn unmarshal(_runtime: &Heap, object: &Object) -> Result<Self, TypeMismatch> {
        match object {
            Object::Float(x) => Ok(*x),
            Object::Int(i) => i.to_f64().ok_or_else(|| TypeMismatch::new("float", "int")),
            Object::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            other => Err(TypeMismatch::new("float", other.type_name())),
        }
    }
}

impl FromForeign<Heap> for i32 {
    fn unmarshal(_runtime: &Heap, object: &Object) -> Result<Self, TypeMismatch> {
        match object {
            Object::Int(i) => i
                .to_i32()
                .ok_or_else(|| TypeMismatch::new("int", format!("int {} out of range", i))),
            Object::Bool(b) => Ok(i32::from(*b)),
            other => Err(TypeMismatch::new("int", other.type_name())),
        }
    }
}

impl FromForeign<Heap> for String {
    fn unmarshal(_runtime: &Heap, object: &Object) -> Result<Self, TypeMismatch> {
        match object {
            Object::Str(s) => Ok(s.to_string()),
            other => Err(TypeMismatch::new("str", other.type_name())),
        }
    }
}
