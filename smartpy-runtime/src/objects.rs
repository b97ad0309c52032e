//! Object system - unified representation for all dynamic values
//!
//! Design: immediates inline, shared heap objects behind reference counts:
//! - None/bool/int/float stored by value
//! - Strings and tuples immutable and shared
//! - Lists mutable and shared (see `list.rs`)
//! - Records wrap adopted native values and are destroyed with their last reference

use crate::adopted::{Adopted, TypeInfo};
use crate::heap::Slot;
use crate::list::List;
use core::fmt;
use std::sync::Arc;

/// Dynamic value
#[derive(Clone)]
pub enum Object {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Tuple(Arc<[Object]>),
    List(List),
    Record(Record),
}

/// Object types for dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ObjectType {
    None = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    String = 4,
    List = 5,
    Tuple = 7,
    Record = 10,
}

impl Object {
    pub fn str(s: &str) -> Self {
        Self::Str(Arc::from(s))
    }

    pub fn tuple(items: impl IntoIterator<Item = Object>) -> Self {
        Self::Tuple(items.into_iter().collect())
    }

    pub fn get_type(&self) -> ObjectType {
        match self {
            Self::None => ObjectType::None,
            Self::Bool(_) => ObjectType::Bool,
            Self::Int(_) => ObjectType::Int,
            Self::Float(_) => ObjectType::Float,
            Self::Str(_) => ObjectType::String,
            Self::Tuple(_) => ObjectType::Tuple,
            Self::List(_) => ObjectType::List,
            Self::Record(_) => ObjectType::Record,
        }
    }

    /// Name of the dynamic type, as the host language would report it
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
            Self::Record(record) => record.type_info().short_name(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Tuple(items) => !items.is_empty(),
            Self::List(list) => !list.is_empty(),
            Self::Record(_) => true,
        }
    }

    /// Forward iterator over the elements, if the object is iterable
    pub fn iter(&self) -> Option<ObjectIter> {
        match self {
            Self::List(list) => Some(ObjectIter::Items(list.snapshot().into_iter())),
            Self::Tuple(items) => Some(ObjectIter::Items(items.to_vec().into_iter())),
            Self::Str(s) => Some(ObjectIter::Chars { text: s.clone(), pos: 0 }),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Object {
    fn from(value: &str) -> Self {
        Self::str(value)
    }
}

impl From<String> for Object {
    fn from(value: String) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<List> for Object {
    fn from(value: List) -> Self {
        Self::List(value)
    }
}

impl From<Record> for Object {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Str(s) => write!(f, "'{}'", s),
            Self::Tuple(items) => {
                let mut t = f.debug_tuple("");
                for item in items.iter() {
                    t.field(item);
                }
                t.finish()
            }
            Self::List(list) => write!(f, "{:?}", list),
            Self::Record(record) => write!(f, "{:?}", record),
        }
    }
}

/// Iterator over an iterable object
pub enum ObjectIter {
    Items(std::vec::IntoIter<Object>),
    Chars { text: Arc<str>, pos: usize },
}

impl Iterator for ObjectIter {
    type Item = Object;

    fn next(&mut self) -> Option<Object> {
        match self {
            Self::Items(items) => items.next(),
            Self::Chars { text, pos } => {
                let ch = text[*pos..].chars().next()?;
                let start = *pos;
                *pos += ch.len_utf8();
                Some(Object::str(&text[start..*pos]))
            }
        }
    }
}

struct RecordCell {
    // Destroyed before the slot is released
    value: Adopted,
    slot: Slot,
}

/// Record object - adopted native value owned by the heap
#[derive(Clone)]
pub struct Record {
    inner: Arc<RecordCell>,
}

impl Record {
    pub(crate) fn new(slot: Slot, value: Adopted) -> Self {
        Self {
            inner: Arc::new(RecordCell { value, slot }),
        }
    }

    /// Heap id of this record
    #[inline]
    pub fn id(&self) -> u64 {
        self.inner.slot.id()
    }

    #[inline]
    pub fn type_info(&self) -> TypeInfo {
        self.inner.value.type_info()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.value.downcast_ref()
    }

    /// Number of handles sharing this record
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Record) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} record #{}>", self.type_info().short_name(), self.id())
    }
}
