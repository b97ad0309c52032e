//! Sequence marshalling - foreign iterables ↔ typed native sequences
//!
//! Architecture:
//! - `runtime.rs` - the `ForeignRuntime` seam and its in-process implementation
//! - `primitives.rs` - f64 / i32 / String conversions, copied by value
//! - `records.rs` - boxed records, handed over through `transfer`
//!
//! Order is preserved in both directions; a failed conversion never
//! surfaces a partial result.

mod primitives;
mod records;
mod runtime;

pub use records::BoxedRecord;
pub use runtime::{ForeignIter, ForeignRuntime};

use crate::errors::{ConversionError, MarshalError, TransferFailure, TypeMismatch};
use crate::identification::{Constants, Parameters};
use tracing::{trace, warn};

/// Native value that can be copied or boxed into a foreign object
pub trait ToForeign<R: ForeignRuntime> {
    fn marshal(&self, runtime: &R) -> Result<R::Object, TransferFailure>;
}

/// Native value that can be built from a foreign object
pub trait FromForeign<R: ForeignRuntime>: Sized {
    fn unmarshal(runtime: &R, object: &R::Object) -> Result<Self, TypeMismatch>;
}

/// Convert a foreign iterable into a native sequence, element by element.
pub fn to_native<R, T>(runtime: &R, iterable: &R::Object) -> Result<Vec<T>, MarshalError>
where
    R: ForeignRuntime,
    T: FromForeign<R>,
{
    let items = runtime.iter(iterable)?;
    let mut out = Vec::with_capacity(items.size_hint().0);

    for (index, item) in items.enumerate() {
        let object = item.map_err(|message| ConversionError::Iteration { index, message })?;
        let value = T::unmarshal(runtime, &object).map_err(|mismatch| {
            warn!(event = "conversion_failed", index, expected = mismatch.expected, found = %mismatch.found);
            ConversionError::element(index, mismatch)
        })?;
        out.push(value);
    }

    trace!(event = "to_native", len = out.len());
    Ok(out)
}

/// Convert a native sequence into a freshly created foreign list.
pub fn to_foreign<R, T>(runtime: &R, items: &[T]) -> Result<R::List, MarshalError>
where
    R: ForeignRuntime,
    T: ToForeign<R>,
{
    let list = runtime.new_list(items.len()).map_err(MarshalError::Allocation)?;
    extend_foreign(runtime, &list, items)?;

    trace!(event = "to_foreign", len = items.len());
    Ok(list)
}

/// Append `items` to an existing foreign list, in order.
///
/// If element `k` fails, elements `0..k` stay in `list` and element `k`
/// has already been released when the error is returned.
pub fn extend_foreign<R, T>(runtime: &R, list: &R::List, items: &[T]) -> Result<(), MarshalError>
where
    R: ForeignRuntime,
    T: ToForeign<R>,
{
    for (index, item) in items.iter().enumerate() {
        let object = item
            .marshal(runtime)
            .map_err(|source| MarshalError::Transfer { index, source })?;
        runtime
            .append(list, object)
            .map_err(|source| MarshalError::Transfer { index, source })?;
    }
    Ok(())
}

pub fn list_to_f64s<R>(runtime: &R, iterable: &R::Object) -> Result<Vec<f64>, MarshalError>
where
    R: ForeignRuntime,
    f64: FromForeign<R>,
{
    to_native(runtime, iterable)
}

pub fn list_to_i32s<R>(runtime: &R, iterable: &R::Object) -> Result<Vec<i32>, MarshalError>
where
    R: ForeignRuntime,
    i32: FromForeign<R>,
{
    to_native(runtime, iterable)
}

pub fn list_to_strings<R>(runtime: &R, iterable: &R::Object) -> Result<Vec<String>, MarshalError>
where
    R: ForeignRuntime,
    String: FromForeign<R>,
{
    to_native(runtime, iterable)
}

pub fn list_to_constants<R: ForeignRuntime>(
    runtime: &R,
    iterable: &R::Object,
) -> Result<Vec<Constants>, MarshalError> {
    to_native(runtime, iterable)
}

pub fn list_to_parameters<R: ForeignRuntime>(
    runtime: &R,
    iterable: &R::Object,
) -> Result<Vec<Parameters>, MarshalError> {
    to_native(runtime, iterable)
}

pub fn f64s_to_list<R>(runtime: &R, values: &[f64]) -> Result<R::List, MarshalError>
where
    R: ForeignRuntime,
    f64: ToForeign<R>,
{
    to_foreign(runtime, values)
}

pub fn i32s_to_list<R>(runtime: &R, values: &[i32]) -> Result<R::List, MarshalError>
where
    R: ForeignRuntime,
    i32: ToForeign<R>,
{
    to_foreign(runtime, values)
}

pub fn strings_to_list<R>(runtime: &R, values: &[String]) -> Result<R::List, MarshalError>
where
    R: ForeignRuntime,
    String: ToForeign<R>,
{
    to_foreign(runtime, values)
}

pub fn constants_to_list<R: ForeignRuntime>(
    runtime: &R,
    consts: &[Constants],
) -> Result<R::List, MarshalError> {
    to_foreign(runtime, consts)
}

pub fn parameters_to_list<R: ForeignRuntime>(
    runtime: &R,
    params: &[Parameters],
) -> Result<R::List, MarshalError> {
    to_foreign(runtime, params)
}

#[cfg(test)]
mod tests;
