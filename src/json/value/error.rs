use crate::json::error::ParseError;
use crate::json::value::Value;
use thiserror::Error;

/// Why a non-final pointer token could not be followed.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum Unresolvable {
    #[error("member '{name}' does not exist")]
    NoSuchMember { name: String },
    #[error("index {index} is out of range for array of length {len}")]
    NoSuchIndex { index: usize, len: usize },
    #[error("'-' refers to a nonexistent element")]
    AppendMarker,
    #[error("a {value_type} can not be traversed")]
    Scalar { value_type: &'static str },
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum PointerErrorKind {
    #[error("pointer paths must be empty or start with '/'")]
    InvalidPointerSyntax,
    #[error("{}", describe_escape(.byte))]
    InvalidEscape { byte: Option<u8> },
    #[error("{message}")]
    InvalidIndex { message: &'static str },
    #[error("unresolvable path, {reason}")]
    UnresolvablePath { reason: Unresolvable },
    #[error("member '{name}' does not exist")]
    MissingMember { name: String },
    #[error("{}", describe_out_of_range(.index, .len))]
    IndexOutOfRange { index: Option<usize>, len: usize },
    #[error("the root can only be an object or an array")]
    InvalidRootAssignment,
    #[error("the root can not be removed")]
    RootNotRemovable,
}

/// An error while parsing a JSON Pointer or applying it to a value.
///
/// `pos` is the byte offset, within the pointer text, of the reference token that caused the
/// error. Root errors and syntax errors at the start of the pointer have `pos` 0.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("{kind} at index {pos}")]
pub struct PointerError {
    pub kind: PointerErrorKind,
    pub pos: usize,
}

impl PointerError {
    /// True for errors in the pointer text itself, the same pointer fails on every document.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self.kind,
            PointerErrorKind::InvalidPointerSyntax
                | PointerErrorKind::InvalidEscape { .. }
                | PointerErrorKind::InvalidIndex { .. }
        )
    }
}

fn describe_escape(byte: &Option<u8>) -> String {
    match byte {
        Some(b) if b.is_ascii_graphic() => {
            format!("invalid escape '~{}', expected '~0' or '~1'", *b as char)
        }
        Some(b) => format!("invalid escape '~' followed by (0x{b:02X}), expected '~0' or '~1'"),
        None => "unpaired '~' at the end of a token, expected '~0' or '~1'".to_string(),
    }
}

fn describe_out_of_range(index: &Option<usize>, len: &usize) -> String {
    match index {
        Some(index) => format!("index {index} is out of range for array of length {len}"),
        None => "'-' refers to a nonexistent element".to_string(),
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum OpError {
    #[error("missing required member '{member}'")]
    MissingMember { member: &'static str },
    #[error("expected {expected} for '{field}'")]
    UnexpectedField {
        field: &'static str,
        expected: &'static str,
    },
    #[error("unsupported operation '{op}'")]
    UnsupportedOperation { op: String },
    #[error("pointer '{path}': {source}")]
    Pointer { path: String, source: PointerError },
    #[error("no value exists at '{path}'")]
    MissingTarget { path: String },
    #[error("can not move '{from}' into its own location '{path}'")]
    PathOverlap { from: String, path: String },
    #[error("test failed at '{path}', expected {expected} but found {actual}")]
    TestFailed {
        path: String,
        expected: Value,
        actual: Value,
    },
}

impl OpError {
    /// True when the operation object itself is invalid: a required member is missing, a member
    /// has the wrong type, or a pointer does not parse.
    pub fn is_malformed(&self) -> bool {
        match self {
            OpError::MissingMember { .. } | OpError::UnexpectedField { .. } => true,
            OpError::Pointer { source, .. } => source.is_malformed(),
            _ => false,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum PatchErrorKind {
    #[error(transparent)]
    Parse(ParseError),
    #[error("expected {expected}")]
    UnexpectedValue { expected: &'static str },
    #[error(transparent)]
    InvalidOp(OpError),
}

/// An error while reading or applying a JSON Patch document.
///
/// `index` is the position of the failing operation within the patch, `None` when the patch
/// document as a whole is invalid (not JSON, not an array).
#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("{}", describe_patch_error(.kind, .index))]
pub struct PatchError {
    pub kind: PatchErrorKind,
    pub index: Option<usize>,
}

impl PatchError {
    pub fn op_error(&self) -> Option<&OpError> {
        match &self.kind {
            PatchErrorKind::InvalidOp(err) => Some(err),
            _ => None,
        }
    }
}

fn describe_patch_error(kind: &PatchErrorKind, index: &Option<usize>) -> String {
    match index {
        Some(index) => format!("operation {index} failed: {kind}"),
        None => kind.to_string(),
    }
}
