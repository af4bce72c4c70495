//! Immutable JSON values with RFC 6901 JSON Pointer and RFC 6902 JSON Patch support.
//!
//! Values are never modified in place: every pointer or patch operation returns a new root that
//! shares its untouched subtrees with the document it was applied to.
//!
//! ```
//! # use jolt_patch::{json, Patch};
//! #
//! let doc = jolt_patch::from_str(r#"{"a": [1, 2]}"#).unwrap();
//! let patch: Patch = r#"[{"op": "add", "path": "/a/-", "value": 5}]"#.parse().unwrap();
//!
//! assert_eq!(doc.patch(&patch).unwrap(), json!({"a": [1, 2, 5]}));
//! ```

pub use crate::json::error::{ParseError, ParseErrorKind, StringErrorKind};
pub use crate::json::number::Number;
pub use crate::json::value::error::{
    OpError, PatchError, PatchErrorKind, PointerError, PointerErrorKind, Unresolvable,
};
pub use crate::json::value::patch::{Operation, Patch};
pub use crate::json::value::pointer::{escape_token, unescape_token, Pointer};
pub use crate::json::value::reference::{Position, Reference, ReferenceChain};
pub use crate::json::value::{Map, Value};
pub use crate::json::{INPUT_BUFFER_LIMIT, NESTING_DEPTH_LIMIT, STRING_LENGTH_LIMIT};

mod json;
mod macros;

pub fn from_slice(buffer: &[u8]) -> Result<Value, ParseError> {
    json::parse(buffer)
}

pub fn from_str(json: &str) -> Result<Value, ParseError> {
    let buffer = json.as_bytes();
    json::parse(buffer)
}
