//! Structural cloning
//!
//! Produces deep copies of [`Value`]s that share no container with their
//! source, so mutating either side never shows through on the other.

use crate::value::{Date, Value};

/// Deep clones a value
///
/// - Primitives are returned as-is (strings keep their allocation).
/// - Dates become a new handle holding the same instant.
/// - Arrays are rebuilt element by element, preserving order and length.
/// - Objects are rebuilt from their **own** properties only, in insertion
///   order. Inherited properties are skipped, and the result is always a
///   plain object: prototype and class tag are not carried over.
///
/// The input is never mutated.
///
/// # Cycles
/// Circular references are not detected. Cloning a value that contains
/// itself recurses until the stack overflows.
pub fn deep_clone(value: &Value) -> Value {
    match value {
        Value::Undefined
        | Value::Null
        | Value::Bool(_)
        | Value::Number(_)
        | Value::String(_) => value.clone(),
        Value::Date(date) => Value::Date(Date::new(date.instant())),
        Value::Array(array) => Value::Array(array.items().iter().map(deep_clone).collect()),
        Value::Object(object) => Value::Object(
            object
                .own()
                .iter()
                .map(|(key, item)| (key.clone(), deep_clone(item)))
                .collect(),
        ),
    }
}
