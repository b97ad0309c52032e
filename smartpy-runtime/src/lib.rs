//! smartpy runtime - in-process dynamic object model
//!
//! Reference counted objects (none/bool/int/float/str/tuple/list) plus
//! records that adopt native values, allocated against a heap registry
//! that can be given a budget.

pub mod adopted;
pub mod heap;
pub mod list;
pub mod objects;

pub use adopted::{Adopted, TypeInfo};
pub use heap::{AllocError, Heap, HeapConfig, HeapStats};
pub use list::List;
pub use objects::{Object, ObjectIter, ObjectType, Record};
