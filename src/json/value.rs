use crate::json::number::Number;
use indexmap::IndexMap;
use std::sync::Arc;

pub(crate) mod error;
mod from;
pub(crate) mod patch;
pub(crate) mod pointer;
pub(crate) mod reference;

use error::{PatchError, PointerError};
use patch::Patch;
use pointer::Pointer;

/// Insertion ordered object members.
pub type Map = IndexMap<String, Value>;

/// An immutable JSON value.
///
/// Containers are reference counted, cloning a `Value` never copies an object or an array. There
/// is no way to mutate a value in place; pointer and patch operations return a new root that
/// shares every untouched subtree with the value they were applied to.
///
/// Object equality ignores member order, `{"a":1,"b":2}` equals `{"b":2,"a":1}`.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub enum Value {
    Object(Arc<Map>),
    Array(Arc<Vec<Value>>),
    Number(Number),
    String(String),
    Bool(bool),
    #[default]
    Null,
}

impl Value {
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    // objects and arrays are the only values a pointer can traverse
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Array(_))
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(num) => Some(num),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn value_type(&self) -> &'static str {
        match self {
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Null => "null",
        }
    }

    /// Looks up a value by an RFC 6901 JSON Pointer.
    ///
    /// # Example
    ///
    /// ```
    /// # use jolt_patch::json;
    /// #
    /// let val = json!({"users": [{"name": "Alice"}, {"name": "Bob"}]});
    ///
    /// assert_eq!(val.pointer("/users/1/name").unwrap(), &json!("Bob"));
    /// assert_eq!(val.pointer("").unwrap(), &val);
    /// ```
    pub fn pointer(&self, pointer: &str) -> Result<&Value, PointerError> {
        Pointer::parse(pointer)?.get(self)
    }

    /// Applies an RFC 6902 JSON Patch and returns the new document, `self` is left untouched.
    pub fn patch(&self, patch: &Patch) -> Result<Value, PatchError> {
        patch.apply(self)
    }
}


// arbitrary documents for the property tests, nested at most 3 levels deep
#[cfg(test)]
pub(crate) mod strategy {
    use super::Value;
    use proptest::prelude::*;

    pub(crate) fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            (-1e6..1e6f64).prop_map(Value::from),
            "[a-z~/ \"\\\\\n]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
                prop::collection::vec(("[a-z~/]{0,3}", inner), 0..4)
                    .prop_map(|members| members.into_iter().collect::<Value>()),
            ]
        })
    }
}
