use super::escapes::{EscapeError, EscapeErrorKind};
use super::number::NumericError;
use super::utf8::Utf8Error;
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum StringErrorKind {
    UnexpectedEof,
    InvalidByteSequence { len: u8 },
    InvalidSurrogate,
    UnknownEscapedCharacter { byte: u8 },
    // incomplete sequence is just UnexpectedEof
    InvalidUnicodeSequence { digit: u8 },
    InvalidControlCharacter { byte: u8 },
}

#[derive(Debug, PartialEq, Eq)]
pub(super) struct StringError {
    pub(super) kind: StringErrorKind,
    pub(super) pos: usize,
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum ParseErrorKind {
    #[error("{}", describe_string_error(.0))]
    MalformedString(StringErrorKind),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("{}", describe_unexpected_character(.byte))]
    UnexpectedCharacter { byte: u8 },
    #[error("invalid number: {message}")]
    InvalidNumber { message: &'static str },
    #[error("{}", describe_unexpected_token(.expected))]
    UnexpectedToken { expected: Option<&'static str> },
    #[error("nesting depth exceeded limit of {depth}")]
    NestingDepthLimitExceeded { depth: u16 },
    #[error("input buffer exceeded limit of {len} bytes")]
    InputBufferLimitExceeded { len: usize },
    #[error("string value exceeded limit of {len} bytes")]
    StringLengthLimitExceeded { len: usize },
}

/// An error while reading JSON text, `pos` is the byte offset in the input where it was detected.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("{kind} at index {pos}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub pos: usize,
}

fn describe_string_error(kind: &StringErrorKind) -> String {
    match kind {
        StringErrorKind::UnexpectedEof => "unexpected end of input, unterminated string".to_string(),
        StringErrorKind::InvalidByteSequence { len } => format!("invalid {len} byte utf-8 sequence"),
        StringErrorKind::InvalidSurrogate => "invalid surrogate pair".to_string(),
        // the byte value might be part of an utf8 sequence
        StringErrorKind::UnknownEscapedCharacter { byte } if byte.is_ascii_graphic() => {
            format!("unknown escape character '{}'", *byte as char)
        }
        StringErrorKind::UnknownEscapedCharacter { byte } => {
            format!("unknown escape character (0x{byte:02X})")
        }
        StringErrorKind::InvalidUnicodeSequence { digit } => {
            format!("invalid hex digit (0x{digit:02X})")
        }
        StringErrorKind::InvalidControlCharacter { byte } => {
            format!("invalid control character (0x{byte:02X})")
        }
    }
}

fn describe_unexpected_character(byte: &u8) -> String {
    // can be a byte from a utf8 sequence or a character with no text representation
    if byte.is_ascii_graphic() {
        format!("unexpected character '{}'", *byte as char)
    } else {
        format!("unexpected byte (0x{byte:02X})")
    }
}

fn describe_unexpected_token(expected: &Option<&'static str>) -> String {
    match expected {
        Some(expected) => format!("unexpected token, expected {expected}"),
        None => "unexpected token".to_string(),
    }
}

impl From<Utf8Error> for StringError {
    fn from(err: Utf8Error) -> Self {
        StringError {
            kind: StringErrorKind::InvalidByteSequence { len: err.len },
            pos: err.pos,
        }
    }
}

impl From<EscapeError> for StringError {
    fn from(err: EscapeError) -> Self {
        let kind = match err.kind {
            EscapeErrorKind::UnexpectedEof => StringErrorKind::UnexpectedEof,
            EscapeErrorKind::UnknownEscapedCharacter { byte } => {
                StringErrorKind::UnknownEscapedCharacter { byte }
            }
            EscapeErrorKind::InvalidUnicodeSequence { digit } => {
                StringErrorKind::InvalidUnicodeSequence { digit }
            }
            EscapeErrorKind::InvalidSurrogate => StringErrorKind::InvalidSurrogate,
        };
        StringError { kind, pos: err.pos }
    }
}

impl From<StringError> for ParseError {
    fn from(err: StringError) -> Self {
        ParseError {
            kind: ParseErrorKind::MalformedString(err.kind),
            pos: err.pos,
        }
    }
}

impl From<NumericError> for ParseError {
    fn from(err: NumericError) -> Self {
        ParseError {
            kind: ParseErrorKind::InvalidNumber {
                message: err.message,
            },
            pos: err.pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = ParseError {
            kind: ParseErrorKind::UnexpectedToken {
                expected: Some("colon ':'"),
            },
            pos: 8,
        };
        assert_eq!(err.to_string(), "unexpected token, expected colon ':' at index 8");

        let err = ParseError {
            kind: ParseErrorKind::MalformedString(StringErrorKind::InvalidControlCharacter {
                byte: b'\n',
            }),
            pos: 1,
        };
        assert_eq!(err.to_string(), "invalid control character (0x0A) at index 1");
    }
}
