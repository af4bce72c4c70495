use super::number::{self, HexError};
use thiserror::Error;

#[derive(Debug, PartialEq, Eq)]
pub(super) enum EscapeErrorKind {
    UnexpectedEof,
    UnknownEscapedCharacter { byte: u8 },
    InvalidUnicodeSequence { digit: u8 },
    InvalidSurrogate,
}

#[derive(Debug, PartialEq, Eq, Error)]
#[error("invalid escape sequence at index {pos}")]
pub(super) struct EscapeError {
    pub(super) kind: EscapeErrorKind,
    pub(super) pos: usize,
}

// pos is at the backslash
pub(super) fn check_escape_character(buffer: &[u8], pos: usize) -> Result<(), EscapeError> {
    let i = pos + 1;
    let Some(&next) = buffer.get(i) else {
        return Err(EscapeError {
            kind: EscapeErrorKind::UnexpectedEof,
            pos,
        });
    };

    if !matches!(next, b'\\' | b'"' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' | b'u') {
        return Err(EscapeError {
            kind: EscapeErrorKind::UnknownEscapedCharacter { byte: next },
            pos: i,
        });
    }
    if next == b'u' {
        check_unicode_escape(buffer, i)?;
    }
    Ok(())
}

// only called on sequences check_escape_character() accepted
pub(super) fn map_escape_character(buffer: &[u8], pos: usize) -> char {
    match buffer[pos + 1] {
        b'\\' => '\\',
        b'"' => '"',
        b'/' => '/',
        b'b' => '\x08',
        b'f' => '\x0C',
        b'n' => '\n',
        b'r' => '\r',
        b't' => '\t',
        _ => decode_unicode(buffer, pos),
    }
}

// returns the length of an escape sequence; \n is 2, é is 6, a surrogate pair is 12
pub(super) fn len(buffer: &[u8], pos: usize) -> usize {
    if buffer[pos + 1] != b'u' {
        return 2;
    }
    match number::hex_to_u16(&buffer[pos + 2..pos + 6]) {
        Ok(val) if is_surrogate(val) => 12,
        _ => 6,
    }
}

// pos is at 'u', 4 hex digits must follow
fn check_unicode_escape(buffer: &[u8], pos: usize) -> Result<(), EscapeError> {
    let start = pos - 1;
    if pos + 4 >= buffer.len() {
        return Err(EscapeError {
            kind: EscapeErrorKind::UnexpectedEof,
            pos: start,
        });
    }

    let val = hex(buffer, pos + 1)?;
    if is_surrogate(val) {
        validate_surrogate(buffer, start, val)?;
    }
    Ok(())
}

fn hex(buffer: &[u8], pos: usize) -> Result<u16, EscapeError> {
    number::hex_to_u16(&buffer[pos..pos + 4]).map_err(|HexError { digit, pos: offset }| {
        EscapeError {
            kind: EscapeErrorKind::InvalidUnicodeSequence { digit },
            pos: pos + offset,
        }
    })
}

fn decode_unicode(buffer: &[u8], pos: usize) -> char {
    let Ok(code_unit) = number::hex_to_u16(&buffer[pos + 2..pos + 6]) else {
        return char::REPLACEMENT_CHARACTER;
    };

    let code_point = if is_surrogate(code_unit) {
        // \uXXXX\uXXXX, the low surrogate starts 6 bytes after the high one
        match number::hex_to_u16(&buffer[pos + 8..pos + 12]) {
            Ok(low) => decode_surrogate_pair(code_unit as u32, low as u32),
            Err(_) => return char::REPLACEMENT_CHARACTER,
        }
    } else {
        code_unit as u32
    };
    char::from_u32(code_point).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn is_surrogate(val: u16) -> bool {
    matches!(val, 0xD800..=0xDFFF)
}

fn is_high_surrogate(val: u16) -> bool {
    matches!(val, 0xD800..=0xDBFF)
}

fn is_low_surrogate(val: u16) -> bool {
    matches!(val, 0xDC00..=0xDFFF)
}

// start is the index of the backslash of the high surrogate
fn validate_surrogate(buffer: &[u8], start: usize, high: u16) -> Result<(), EscapeError> {
    let invalid = EscapeError {
        kind: EscapeErrorKind::InvalidSurrogate,
        pos: start,
    };
    // surrogate pairs do not start with low surrogate, it's always high-low
    if !is_high_surrogate(high) {
        return Err(invalid);
    }
    // \uD83D needs to be followed by \uXXXX
    let i = start + 6;
    if i + 6 > buffer.len() || buffer[i] != b'\\' || buffer[i + 1] != b'u' {
        return Err(invalid);
    }

    let low = hex(buffer, i + 2)?;
    if !is_low_surrogate(low) {
        return Err(invalid);
    }
    Ok(())
}

// https://en.wikipedia.org/wiki/UTF-16#U+D800_to_U+DFFF_(surrogates)
fn decode_surrogate_pair(high: u32, low: u32) -> u32 {
    (high - 0xD800) * 0x400 + low - 0xDC00 + 0x10000
}
