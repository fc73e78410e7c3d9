//! Native value graph model.
//!
//! [`JsValue`] is the closed sum type over every value the codec can move
//! across the wire. Scalars and domain values are plain data; the four
//! composite kinds (array, object, map, set) are shared handles so that two
//! fields can alias one value and an array can contain itself. Identity —
//! the thing the encoder's visited map and the decoder's id table key on —
//! is allocation identity of the handle, never structural equality.
//!
//! Composite handles are `Arc<Mutex<..>>` so values are `Send + Sync` and
//! cheap to clone; the codec itself never mutates a value it did not create
//! and takes no responsibility for caller-side concurrent mutation during a
//! traversal.

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::handle::RemoteRef;

/// A native JavaScript-shaped value.
#[derive(Clone)]
pub enum JsValue {
    /// The `undefined` sentinel.
    Undefined,
    /// The `null` sentinel.
    Null,
    /// Boolean.
    Bool(bool),
    /// Exact integer. Whole doubles decode to this variant; see the
    /// integer/double rule on [`crate::decode`].
    Int(i64),
    /// Floating value, including `NaN`, infinities, and negative zero.
    Float(f64),
    /// String.
    String(String),
    /// Point in time, UTC.
    Date(DateTime<Utc>),
    /// Absolute URL.
    Url(Url),
    /// Arbitrary-precision integer.
    BigInt(BigInt),
    /// Regular expression literal.
    Regex(JsRegex),
    /// Raised-exception description; data, not control flow.
    Error(JsError),
    /// Ordered sequence; shared handle.
    Array(JsArray),
    /// Ordered key/value entries; shared handle.
    Object(JsObject),
    /// Associative container; shared handle. Entries do not cross the wire.
    Map(JsMap),
    /// Collection container; shared handle. Entries do not cross the wire.
    Set(JsSet),
    /// Reference to a remote-resident object.
    Handle(RemoteRef),
}

/// Regular expression literal: pattern source plus raw JS flag letters.
///
/// Flags are kept as written; they are validated against the wire flag
/// vocabulary at encode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsRegex {
    /// Pattern source, as between the slashes of a regex literal.
    pub source: String,
    /// Flag letters, e.g. `"gi"`.
    pub flags: String,
}

impl JsRegex {
    /// Creates a regex literal from source and flag letters.
    pub fn new(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            flags: flags.into(),
        }
    }
}

/// Raised-exception description carried as data.
///
/// A cross-process stack trace cannot be re-thrown as native control flow,
/// so name and stack are preserved verbatim alongside the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsError {
    /// Error kind identifier (e.g. `"TypeError"`).
    pub name: String,
    /// Human-readable message.
    pub message: String,
    /// Formatted stack trace, newline-separated frames.
    pub stack: Option<String>,
}

impl JsError {
    /// Creates an error description.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    /// Attaches a formatted stack trace.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

/// Shared ordered sequence of values.
#[derive(Clone, Default)]
pub struct JsArray(Arc<Mutex<Vec<JsValue>>>);

impl JsArray {
    /// Creates an empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an array from the given elements.
    pub fn from_values(values: impl IntoIterator<Item = JsValue>) -> Self {
        Self(Arc::new(Mutex::new(values.into_iter().collect())))
    }

    /// Appends an element.
    pub fn push(&self, value: JsValue) {
        self.0.lock().push(value);
    }

    /// Returns the element at `index`, if any.
    pub fn get(&self, index: usize) -> Option<JsValue> {
        self.0.lock().get(index).cloned()
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Returns true if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Returns a snapshot of the elements.
    pub fn values(&self) -> Vec<JsValue> {
        self.0.lock().clone()
    }

    /// Returns true if both handles refer to the same allocation.
    pub fn same_identity(&self, other: &JsArray) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for JsArray {
    // Not recursive: arrays can contain themselves.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsArray(len={})", self.len())
    }
}

impl FromIterator<JsValue> for JsArray {
    fn from_iter<T: IntoIterator<Item = JsValue>>(iter: T) -> Self {
        Self::from_values(iter)
    }
}

/// Shared key/value container with unique keys and preserved insertion
/// order.
#[derive(Clone, Default)]
pub struct JsObject(Arc<Mutex<Vec<(String, JsValue)>>>);

impl JsObject {
    /// Creates an empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an object from the given entries. Later duplicates replace
    /// earlier values in place.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, JsValue)>) -> Self {
        let object = Self::new();
        for (key, value) in entries {
            object.insert(key, value);
        }
        object
    }

    /// Inserts a value under `key`. An existing key keeps its position and
    /// gets the new value.
    pub fn insert(&self, key: impl Into<String>, value: JsValue) {
        let key = key.into();
        let mut entries = self.0.lock();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
    }

    /// Returns the value under `key`, if any.
    pub fn get(&self, key: &str) -> Option<JsValue> {
        self.0
            .lock()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Returns true if the object has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Returns the keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.0.lock().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Returns a snapshot of the entries in insertion order.
    pub fn entries(&self) -> Vec<(String, JsValue)> {
        self.0.lock().clone()
    }

    /// Returns true if both handles refer to the same allocation.
    pub fn same_identity(&self, other: &JsObject) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for JsObject {
    // Keys only: values may cycle back to this object.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsObject(keys={:?})", self.keys())
    }
}

/// Shared associative container.
///
/// Entries are never carried over the wire; a decoded map is always empty.
#[derive(Clone, Default)]
pub struct JsMap(Arc<Mutex<Vec<(JsValue, JsValue)>>>);

impl JsMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push_entry(&self, key: JsValue, value: JsValue) {
        self.0.lock().push((key, value));
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Returns true if both handles refer to the same allocation.
    pub fn same_identity(&self, other: &JsMap) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for JsMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsMap(len={})", self.len())
    }
}

/// Shared collection container.
///
/// Entries are never carried over the wire; a decoded set is always empty.
#[derive(Clone, Default)]
pub struct JsSet(Arc<Mutex<Vec<JsValue>>>);

impl JsSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value.
    pub fn add(&self, value: JsValue) {
        self.0.lock().push(value);
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Returns true if the set has no values.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Returns true if both handles refer to the same allocation.
    pub fn same_identity(&self, other: &JsSet) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for JsSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsSet(len={})", self.len())
    }
}

impl JsValue {
    /// Returns true for the `undefined` sentinel.
    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    /// Returns true for the `null` sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, JsValue::Null)
    }

    /// Returns the boolean value, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            JsValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the floating value, if this is a `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the string, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the array handle, if this is an `Array`.
    pub fn as_array(&self) -> Option<&JsArray> {
        match self {
            JsValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the object handle, if this is an `Object`.
    pub fn as_object(&self) -> Option<&JsObject> {
        match self {
            JsValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Returns the handle descriptor, if this is a `Handle`.
    pub fn as_handle(&self) -> Option<&RemoteRef> {
        match self {
            JsValue::Handle(h) => Some(h),
            _ => None,
        }
    }

    /// Returns the error description, if this is an `Error`.
    pub fn as_error(&self) -> Option<&JsError> {
        match self {
            JsValue::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "Undefined"),
            JsValue::Null => write!(f, "Null"),
            JsValue::Bool(b) => write!(f, "Bool({b})"),
            JsValue::Int(i) => write!(f, "Int({i})"),
            JsValue::Float(x) => write!(f, "Float({x})"),
            JsValue::String(s) => write!(f, "String({s:?})"),
            JsValue::Date(d) => write!(f, "Date({d})"),
            JsValue::Url(u) => write!(f, "Url({u})"),
            JsValue::BigInt(b) => write!(f, "BigInt({b})"),
            JsValue::Regex(r) => write!(f, "Regex(/{}/{})", r.source, r.flags),
            JsValue::Error(e) => write!(f, "Error({}: {})", e.name, e.message),
            JsValue::Array(a) => a.fmt(f),
            JsValue::Object(o) => o.fmt(f),
            JsValue::Map(m) => m.fmt(f),
            JsValue::Set(s) => s.fmt(f),
            JsValue::Handle(h) => write!(f, "Handle({})", h.guid()),
        }
    }
}

/// Equality: structural for scalars and domain values, allocation identity
/// for composites. Identity equality is cycle-safe; structural comparison of
/// composites is intentionally not provided.
impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Bool(a), JsValue::Bool(b)) => a == b,
            (JsValue::Int(a), JsValue::Int(b)) => a == b,
            (JsValue::Float(a), JsValue::Float(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Date(a), JsValue::Date(b)) => a == b,
            (JsValue::Url(a), JsValue::Url(b)) => a == b,
            (JsValue::BigInt(a), JsValue::BigInt(b)) => a == b,
            (JsValue::Regex(a), JsValue::Regex(b)) => a == b,
            (JsValue::Error(a), JsValue::Error(b)) => a == b,
            (JsValue::Array(a), JsValue::Array(b)) => a.same_identity(b),
            (JsValue::Object(a), JsValue::Object(b)) => a.same_identity(b),
            (JsValue::Map(a), JsValue::Map(b)) => a.same_identity(b),
            (JsValue::Set(a), JsValue::Set(b)) => a.same_identity(b),
            (JsValue::Handle(a), JsValue::Handle(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for JsValue {
    fn from(value: bool) -> Self {
        JsValue::Bool(value)
    }
}

impl From<i64> for JsValue {
    fn from(value: i64) -> Self {
        JsValue::Int(value)
    }
}

impl From<i32> for JsValue {
    fn from(value: i32) -> Self {
        JsValue::Int(value.into())
    }
}

impl From<f64> for JsValue {
    fn from(value: f64) -> Self {
        JsValue::Float(value)
    }
}

impl From<&str> for JsValue {
    fn from(value: &str) -> Self {
        JsValue::String(value.to_string())
    }
}

impl From<String> for JsValue {
    fn from(value: String) -> Self {
        JsValue::String(value)
    }
}

impl From<JsArray> for JsValue {
    fn from(value: JsArray) -> Self {
        JsValue::Array(value)
    }
}

impl From<JsObject> for JsValue {
    fn from(value: JsObject) -> Self {
        JsValue::Object(value)
    }
}

impl From<RemoteRef> for JsValue {
    fn from(value: RemoteRef) -> Self {
        JsValue::Handle(value)
    }
}
