use crate::json::value::error::{
    OpError, PatchError, PatchErrorKind, PointerError, PointerErrorKind,
};
use crate::json::value::pointer::Pointer;
use crate::json::value::{Map, Value};
use log::debug;
use std::str::FromStr;

enum OpKind {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

/// A single RFC 6902 operation. Pointers are parsed when the operation is read, so applying an
/// operation can only fail because of the document it is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Add { path: Pointer, value: Value },
    Remove { path: Pointer },
    Replace { path: Pointer, value: Value },
    Move { from: Pointer, path: Pointer },
    Copy { from: Pointer, path: Pointer },
    Test { path: Pointer, value: Value },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add { .. } => "add",
            Operation::Remove { .. } => "remove",
            Operation::Replace { .. } => "replace",
            Operation::Move { .. } => "move",
            Operation::Copy { .. } => "copy",
            Operation::Test { .. } => "test",
        }
    }

    pub fn path(&self) -> &Pointer {
        match self {
            Operation::Add { path, .. }
            | Operation::Remove { path }
            | Operation::Replace { path, .. }
            | Operation::Move { path, .. }
            | Operation::Copy { path, .. }
            | Operation::Test { path, .. } => path,
        }
    }

    // target location is the term used to refer to the result of path/from
    pub fn apply(&self, doc: &Value) -> Result<Value, OpError> {
        match self {
            // add the member if it does not exist, update the value if it does
            // append the value if index == len, otherwise shift the elements and insert
            Operation::Add { path, value } => path
                .add(doc, value.clone())
                .map_err(|err| pointer_error(path, err)),
            // target location must exist for the value to be removed or replaced
            Operation::Remove { path } => path.remove(doc).map_err(|err| target_error(path, err)),
            Operation::Replace { path, value } => path
                .replace(doc, value.clone())
                .map_err(|err| target_error(path, err)),
            // combination of remove and add, the value is added to the document after the removal
            // so moving within the same array accounts for the shifted indices
            Operation::Move { from, path } => {
                // a value can't be moved into one of its children, it would cease to exist
                if from.is_prefix_of(path) {
                    return Err(OpError::PathOverlap {
                        from: from.to_string(),
                        path: path.to_string(),
                    });
                }
                let val = from.get(doc).map_err(|err| target_error(from, err))?.clone();
                let removed = from.remove(doc).map_err(|err| target_error(from, err))?;
                path.add(&removed, val).map_err(|err| pointer_error(path, err))
            }
            // copy is nothing but add where copy's path is add's path and the value at copy's from
            // is add's value
            Operation::Copy { from, path } => {
                let val = from.get(doc).map_err(|err| target_error(from, err))?.clone();
                path.add(doc, val).map_err(|err| pointer_error(path, err))
            }
            Operation::Test { path, value } => {
                let actual = path.get(doc).map_err(|err| target_error(path, err))?;
                if actual != value {
                    return Err(OpError::TestFailed {
                        path: path.to_string(),
                        expected: value.clone(),
                        actual: actual.clone(),
                    });
                }
                Ok(doc.clone())
            }
        }
    }

    /// The operation as an RFC 6902 operation object.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("op".to_string(), Value::from(self.name()));
        map.insert("path".to_string(), Value::from(self.path().to_string()));
        match self {
            Operation::Add { value, .. }
            | Operation::Replace { value, .. }
            | Operation::Test { value, .. } => {
                map.insert("value".to_string(), value.clone());
            }
            Operation::Move { from, .. } | Operation::Copy { from, .. } => {
                map.insert("from".to_string(), Value::from(from.to_string()));
            }
            Operation::Remove { .. } => (),
        }
        Value::from(map)
    }
}

/// An RFC 6902 JSON Patch, an ordered list of operations.
///
/// Operations are applied one after the other, each to the document produced by the previous one.
/// The first failing operation aborts the patch and the document that was passed in is returned
/// to the caller untouched, there are no partial updates.
///
/// # Example
///
/// ```
/// # use jolt_patch::{json, Patch};
/// #
/// let patch: Patch = r#"[
///     {"op": "test", "path": "/a", "value": 1},
///     {"op": "replace", "path": "/a", "value": 2}
/// ]"#
/// .parse()
/// .unwrap();
///
/// let doc = json!({"a": 1});
/// assert_eq!(patch.apply(&doc).unwrap(), json!({"a": 2}));
///
/// let err = patch.apply(&json!({"a": 9})).unwrap_err();
/// assert_eq!(err.index, Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Patch(Vec<Operation>);

impl Patch {
    pub fn from_slice(buffer: &[u8]) -> Result<Patch, PatchError> {
        let val = crate::from_slice(buffer).map_err(|err| PatchError {
            kind: PatchErrorKind::Parse(err),
            index: None,
        })?;
        Patch::from_value(&val)
    }

    /// Reads a patch document that was already parsed. Every operation is validated and every
    /// pointer is parsed, the first invalid one is reported with its index.
    pub fn from_value(val: &Value) -> Result<Patch, PatchError> {
        let Value::Array(values) = val else {
            return Err(PatchError {
                kind: PatchErrorKind::UnexpectedValue { expected: "array" },
                // no index because this is the root
                index: None,
            });
        };

        let mut ops = Vec::with_capacity(values.len());
        for (i, elem) in values.iter().enumerate() {
            let Value::Object(map) = elem else {
                return Err(PatchError {
                    kind: PatchErrorKind::UnexpectedValue { expected: "object" },
                    index: Some(i),
                });
            };
            let op = to_op(map).map_err(|err| PatchError {
                kind: PatchErrorKind::InvalidOp(err),
                index: Some(i),
            })?;
            ops.push(op);
        }
        Ok(Patch(ops))
    }

    pub fn operations(&self) -> &[Operation] {
        &self.0
    }

    pub fn apply(&self, doc: &Value) -> Result<Value, PatchError> {
        let mut current = doc.clone();
        for (i, op) in self.0.iter().enumerate() {
            debug!("applying operation {i}: {} '{}'", op.name(), op.path());
            current = op.apply(&current).map_err(|err| PatchError {
                kind: PatchErrorKind::InvalidOp(err),
                index: Some(i),
            })?;
        }
        Ok(current)
    }

    /// The patch as an RFC 6902 patch document, reading it back with [`Patch::from_value`] yields
    /// an equal patch.
    pub fn to_value(&self) -> Value {
        self.0.iter().map(Operation::to_value).collect()
    }
}

impl From<Vec<Operation>> for Patch {
    fn from(ops: Vec<Operation>) -> Self {
        Patch(ops)
    }
}

impl FromStr for Patch {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Patch::from_slice(s.as_bytes())
    }
}

// a location that must exist but doesn't is reported as the path of the operation, any other
// pointer error is kept as is
fn target_error(ptr: &Pointer, err: PointerError) -> OpError {
    match err.kind {
        PointerErrorKind::MissingMember { .. } | PointerErrorKind::IndexOutOfRange { .. } => {
            OpError::MissingTarget {
                path: ptr.to_string(),
            }
        }
        _ => pointer_error(ptr, err),
    }
}

fn pointer_error(ptr: &Pointer, err: PointerError) -> OpError {
    OpError::Pointer {
        path: ptr.to_string(),
        source: err,
    }
}

// members other than op, path, from and value are ignored
fn to_op(map: &Map) -> Result<Operation, OpError> {
    let op = string_member(map, "op")?;
    let kind = to_kind(op).ok_or_else(|| OpError::UnsupportedOperation { op: op.to_string() })?;
    let path = pointer_member(map, "path")?;

    match kind {
        OpKind::Add => {
            let value = value(map)?;
            Ok(Operation::Add { path, value })
        }
        OpKind::Remove => Ok(Operation::Remove { path }),
        OpKind::Replace => {
            let value = value(map)?;
            Ok(Operation::Replace { path, value })
        }
        OpKind::Move => {
            let from = pointer_member(map, "from")?;
            Ok(Operation::Move { from, path })
        }
        OpKind::Copy => {
            let from = pointer_member(map, "from")?;
            Ok(Operation::Copy { from, path })
        }
        OpKind::Test => {
            let value = value(map)?;
            Ok(Operation::Test { path, value })
        }
    }
}

fn value(map: &Map) -> Result<Value, OpError> {
    map.get("value")
        .cloned()
        .ok_or(OpError::MissingMember { member: "value" })
}

fn string_member<'a>(map: &'a Map, member: &'static str) -> Result<&'a str, OpError> {
    let val = map.get(member).ok_or(OpError::MissingMember { member })?;
    val.as_str().ok_or(OpError::UnexpectedField {
        field: member,
        expected: "string",
    })
}

fn pointer_member(map: &Map, member: &'static str) -> Result<Pointer, OpError> {
    let text = string_member(map, member)?;
    Pointer::parse(text).map_err(|err| OpError::Pointer {
        path: text.to_string(),
        source: err,
    })
}

fn to_kind(val: &str) -> Option<OpKind> {
    match val {
        "add" => Some(OpKind::Add),
        "remove" => Some(OpKind::Remove),
        "replace" => Some(OpKind::Replace),
        "move" => Some(OpKind::Move),
        "copy" => Some(OpKind::Copy),
        "test" => Some(OpKind::Test),
        _ => None,
    }
}
