//! Dynamic value model
//!
//! `Value` is the datum every helper in this crate accepts. Primitives are
//! immutable; dates, arrays and objects are reference-counted handles with
//! interior mutability, so two `Value`s can alias the same container.
//!
//! Cloning a `Value` with [`Clone`] copies the handle (both sides keep seeing
//! the same container). Use [`Value::deep_clone`] for an independent copy.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

/// Largest integer an `f64` represents exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A dynamically typed value
///
/// `PartialEq` is deep structural equality: dates compare by instant,
/// arrays element-wise and objects by their own properties. Prototypes and
/// class tags are not compared. Use [`Value::same_identity`] to test whether
/// two values are the same container.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value
    Undefined,
    /// Explicit null
    Null,
    /// Boolean scalar
    Bool(bool),
    /// IEEE 754 number
    Number(f64),
    /// Immutable, shared string
    String(Rc<str>),
    /// Mutable handle to an instant
    Date(Date),
    /// Mutable handle to an ordered list
    Array(Array),
    /// Mutable handle to a key-value mapping
    Object(Object),
}

impl Value {
    /// Builds a string value
    pub fn string(text: &str) -> Self {
        Value::String(Rc::from(text))
    }

    /// Builds a new array from the given items
    pub fn array<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Array(items.into_iter().collect())
    }

    /// Builds a new plain object from the given properties
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    /// Builds a new date handle at the given instant
    pub fn date(instant: DateTime<Utc>) -> Self {
        Value::Date(Date::new(instant))
    }

    /// Returns `true` for undefined, null, booleans, numbers and strings
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Undefined | Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
        )
    }

    /// Short lowercase name of the variant, used in logs and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&Date> {
        match self {
            Value::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Identity comparison
    ///
    /// Containers are identical only when they are the same handle.
    /// Primitives are identical when they hold the same value, except
    /// that `NaN` is never identical to anything.
    pub fn same_identity(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Returns an independent deep copy of this value
    ///
    /// See [`deep_clone`](crate::utils::cloning::deep_clone).
    pub fn deep_clone(&self) -> Value {
        crate::utils::cloning::deep_clone(self)
    }

    /// Converts this value to JSON
    ///
    /// Dates become RFC 3339 strings with millisecond precision. Undefined
    /// and non-finite numbers become `null`, and undefined object
    /// properties are omitted.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Undefined | Value::Null => JsonValue::Null,
            Value::Bool(flag) => JsonValue::Bool(*flag),
            Value::Number(number) => number_to_json(*number),
            Value::String(text) => JsonValue::String(text.to_string()),
            Value::Date(date) => {
                JsonValue::String(date.instant().to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Array(array) => JsonValue::Array(array.items().iter().map(Value::to_json).collect()),
            Value::Object(object) => JsonValue::Object(
                object
                    .own()
                    .iter()
                    .filter(|(_, value)| !matches!(value, Value::Undefined))
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

fn number_to_json(number: f64) -> JsonValue {
    if number.fract() == 0.0 && number.abs() < MAX_SAFE_INTEGER {
        JsonValue::from(number as i64)
    } else {
        serde_json::Number::from_f64(number)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a.instant() == b.instant(),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b) || *a.items() == *b.items(),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b) || *a.own() == *b.own(),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Number(number)
    }
}

impl From<i32> for Value {
    fn from(number: i32) -> Self {
        Value::Number(f64::from(number))
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Number(number as f64)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::string(text)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(Rc::from(text))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(instant: DateTime<Utc>) -> Self {
        Value::date(instant)
    }
}

impl From<Date> for Value {
    fn from(date: Date) -> Self {
        Value::Date(date)
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Array::from_vec(items))
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(flag) => Value::Bool(flag),
            JsonValue::Number(number) => number.as_f64().map_or(Value::Null, Value::Number),
            JsonValue::String(text) => Value::from(text),
            JsonValue::Array(items) => Value::array(items.into_iter().map(Value::from)),
            JsonValue::Object(map) => {
                Value::object(map.into_iter().map(|(key, value)| (key, Value::from(value))))
            }
        }
    }
}

/// Shared, mutable handle to an instant in time
#[derive(Debug, Clone)]
pub struct Date(Rc<Cell<DateTime<Utc>>>);

impl Date {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Date(Rc::new(Cell::new(instant)))
    }

    /// Builds a date from milliseconds since the Unix epoch
    ///
    /// Returns `None` when the offset is outside chrono's representable range.
    pub fn from_timestamp_millis(millis: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(millis).map(Date::new)
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0.get()
    }

    /// Moves this date (and every alias of it) to a new instant
    pub fn set_instant(&self, instant: DateTime<Utc>) {
        self.0.set(instant);
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.instant().timestamp_millis()
    }

    /// Returns `true` if both handles point to the same date
    pub fn ptr_eq(&self, other: &Date) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Shared, mutable handle to an ordered list of values
#[derive(Debug, Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        Array(Rc::new(RefCell::new(items)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns the element at `index` (a handle copy for containers)
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    /// Replaces the element at `index`
    ///
    /// Returns `false` without changing anything if `index` is out of bounds.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.0.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    pub fn pop(&self) -> Option<Value> {
        self.0.borrow_mut().pop()
    }

    /// Borrows the elements for reading
    ///
    /// # Panics
    /// Panics if the array is mutated while the borrow is alive.
    pub fn items(&self) -> Ref<'_, Vec<Value>> {
        self.0.borrow()
    }

    /// Returns `true` if both handles point to the same array
    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Array::from_vec(iter.into_iter().collect())
    }
}

#[derive(Debug, Default)]
struct ObjectData {
    class: Option<Rc<str>>,
    own: IndexMap<String, Value>,
    prototype: Option<Object>,
}

/// Shared, mutable handle to a key-value mapping
///
/// Own properties keep insertion order. An object may have a prototype,
/// whose properties are visible through [`Object::get`] but are not own
/// properties. A class tag marks an exotic (non-plain) object kind.
#[derive(Debug, Clone, Default)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Object {
    /// Creates an empty plain object
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty object inheriting from `prototype`
    pub fn with_prototype(prototype: &Object) -> Self {
        let object = Object::new();
        object.set_prototype(Some(prototype.clone()));
        object
    }

    /// Creates an empty exotic object tagged with `class`
    pub fn with_class(class: &str) -> Self {
        Object(Rc::new(RefCell::new(ObjectData {
            class: Some(Rc::from(class)),
            ..ObjectData::default()
        })))
    }

    /// The class tag, `None` for plain objects
    pub fn class(&self) -> Option<Rc<str>> {
        self.0.borrow().class.clone()
    }

    pub fn prototype(&self) -> Option<Object> {
        self.0.borrow().prototype.clone()
    }

    pub fn set_prototype(&self, prototype: Option<Object>) {
        self.0.borrow_mut().prototype = prototype;
    }

    /// Looks up `key` on the object, then along its prototype chain
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut current = Some(self.clone());
        while let Some(object) = current {
            let data = object.0.borrow();
            if let Some(value) = data.own.get(key) {
                return Some(value.clone());
            }
            current = data.prototype.clone();
        }
        None
    }

    /// Looks up an own property only
    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.0.borrow().own.get(key).cloned()
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.0.borrow().own.contains_key(key)
    }

    /// Sets an own property, returning the previous own value
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.borrow_mut().own.insert(key.into(), value)
    }

    /// Removes an own property, keeping the order of the remaining ones
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().own.shift_remove(key)
    }

    /// Own property names in insertion order
    pub fn own_keys(&self) -> Vec<String> {
        self.0.borrow().own.keys().cloned().collect()
    }

    /// Number of own properties
    pub fn len(&self) -> usize {
        self.0.borrow().own.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().own.is_empty()
    }

    /// Borrows the own properties for reading
    ///
    /// # Panics
    /// Panics if the object is mutated while the borrow is alive.
    pub fn own(&self) -> Ref<'_, IndexMap<String, Value>> {
        Ref::map(self.0.borrow(), |data| &data.own)
    }

    /// Returns `true` if both handles point to the same object
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Object(Rc::new(RefCell::new(ObjectData {
            own: iter.into_iter().collect(),
            ..ObjectData::default()
        })))
    }
}
