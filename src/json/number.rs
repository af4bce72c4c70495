use bigdecimal::{BigDecimal, ToPrimitive};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// much better approach than passing boolean flags around, foo(true, true, false) is hard to understand
struct NumberState {
    decimal_point: bool,
    scientific_notation: bool,
}

/// An exact JSON number.
///
/// Integers that fit in 64 bits are kept as `i64`/`u64`, everything else (fractions, exponents,
/// big integers) is kept as an arbitrary precision decimal, so no precision is lost between
/// parsing and writing. Equality is numeric: `1`, `1.0` and `10e-1` are equal.
#[derive(Debug, Clone)]
pub struct Number(NumberKind);

// The way BigDecimal works is by storing every digit of the number as BigInt, (unscaled value,
// an arbitrary-precision integer) and also the number of decimal places as int(scale)
//
//  The number 123.45 is stored as:
//      Unscaled value: 12345
//      Scale: 2
//
// The actual value is calculated as: unscaled value * 10^(-scale)
#[derive(Debug, Clone)]
enum NumberKind {
    I64(i64),
    // only used for values above i64::MAX
    U64(u64),
    Decimal(BigDecimal),
}

impl Number {
    pub fn as_i64(&self) -> Option<i64> {
        match &self.0 {
            NumberKind::I64(v) => Some(*v),
            NumberKind::U64(_) => None,
            NumberKind::Decimal(v) if v.is_integer() => v.to_i64(),
            NumberKind::Decimal(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match &self.0 {
            NumberKind::I64(v) => u64::try_from(*v).ok(),
            NumberKind::U64(v) => Some(*v),
            NumberKind::Decimal(v) if v.is_integer() => v.to_u64(),
            NumberKind::Decimal(_) => None,
        }
    }

    // lossy for decimals that have no exact binary representation
    pub fn as_f64(&self) -> Option<f64> {
        match &self.0 {
            NumberKind::I64(v) => Some(*v as f64),
            NumberKind::U64(v) => Some(*v as f64),
            NumberKind::Decimal(v) => v.to_f64().filter(|f| f.is_finite()),
        }
    }

    pub fn as_big_decimal(&self) -> BigDecimal {
        match &self.0 {
            NumberKind::I64(v) => BigDecimal::from(*v),
            NumberKind::U64(v) => BigDecimal::from(*v),
            NumberKind::Decimal(v) => v.clone(),
        }
    }

    /// Converts a float through its shortest round-trip decimal representation, `None` for NaN
    /// and the infinities since JSON has no text for them.
    pub fn from_f64(val: f64) -> Option<Number> {
        if !val.is_finite() {
            return None;
        }
        // 3.0_f64.to_string() is "3", the integer path keeps it as I64
        let text = val.to_string();
        parse(text.as_bytes()).ok()
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (NumberKind::I64(a), NumberKind::I64(b)) => a == b,
            (NumberKind::U64(a), NumberKind::U64(b)) => a == b,
            // BigDecimal equality ignores the scale, 1.0 == 1
            _ => self.as_big_decimal() == other.as_big_decimal(),
        }
    }
}

impl Eq for Number {}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            NumberKind::I64(v) => write!(f, "{v}"),
            NumberKind::U64(v) => write!(f, "{v}"),
            NumberKind::Decimal(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Number {
    fn from(val: i64) -> Self {
        Number(NumberKind::I64(val))
    }
}

impl From<u64> for Number {
    fn from(val: u64) -> Self {
        match i64::try_from(val) {
            Ok(v) => Number(NumberKind::I64(v)),
            Err(_) => Number(NumberKind::U64(val)),
        }
    }
}

impl From<BigDecimal> for Number {
    fn from(val: BigDecimal) -> Self {
        Number(NumberKind::Decimal(val))
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
#[error("invalid hex digit (0x{digit:02X}) at index {pos}")]
pub(super) struct HexError {
    pub(super) digit: u8,
    pub(super) pos: usize,
}

#[derive(Debug, PartialEq, Eq, Error)]
#[error("{message} at index {pos}")]
pub(super) struct NumericError {
    pub(super) message: &'static str,
    pub(super) pos: usize,
}

// We return u16 because the valid range for the Unicode sequences are 0x0000-0xFFFF(0-65535)
// 0-65535 is the range for u16
pub(super) fn hex_to_u16(buffer: &[u8]) -> Result<u16, HexError> {
    let mut val: u16 = 0;

    // digit - b'a' returns a value in the [0,25] range but in base 16 a/A is 10 not 0, b/B is 11
    // + 10 brings into that range
    for (index, &byte) in buffer.iter().enumerate() {
        let hex_val = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => return Err(HexError { digit: byte, pos: index }),
        };
        val = val * 16 + hex_val as u16;
    }
    Ok(val)
}

// The buffer is a number the lexer already validated. Integers try i64 then u64 before falling
// back to BigDecimal. An exponent that does not fit in an i64 is the only way this can fail.
pub(super) fn parse(buffer: &[u8]) -> Result<Number, NumericError> {
    let out_of_range = NumericError {
        message: "number out of range",
        pos: 0,
    };
    let Ok(s) = std::str::from_utf8(buffer) else {
        return Err(out_of_range);
    };
    let float = buffer.iter().any(|&b| matches!(b, b'.' | b'e' | b'E'));

    if !float {
        if let Ok(v) = s.parse::<i64>() {
            return Ok(Number::from(v));
        }
        if let Ok(v) = s.parse::<u64>() {
            return Ok(Number::from(v));
        }
    }
    BigDecimal::from_str(s)
        .map(Number::from)
        .map_err(|_| out_of_range)
}

// pos is at the first byte of the number, after reading it is at the first byte past the number
pub(super) fn read(buffer: &[u8], pos: &mut usize) -> Result<(), NumericError> {
    let len = buffer.len();
    let current = buffer[*pos];
    let next = buffer.get(*pos + 1);

    match (current, next) {
        // +9
        (b'+', _) => {
            return Err(NumericError {
                message: "json specification prohibits numbers from being prefixed with a plus sign",
                pos: *pos,
            })
        }
        // - or -a, -0 is valid
        (b'-', None) => {
            return Err(NumericError {
                message: "a valid numeric value requires a digit (0-9) after the minus sign",
                pos: *pos,
            })
        }
        (b'-', Some(n)) if !n.is_ascii_digit() => {
            return Err(NumericError {
                message: "a valid numeric value requires a digit (0-9) after the minus sign",
                pos: *pos,
            })
        }
        _ => (),
    }

    // 05, -05 not allowed
    let first_digit = if current == b'-' { *pos + 1 } else { *pos };
    if buffer[first_digit] == b'0' && buffer.get(first_digit + 1).is_some_and(u8::is_ascii_digit) {
        return Err(NumericError {
            message: "leading zeros are not allowed",
            pos: *pos,
        });
    }

    *pos += 1;
    let mut state = NumberState {
        decimal_point: false,
        scientific_notation: false,
    };
    while *pos < len {
        match buffer[*pos] {
            b'0'..=b'9' => (),
            b'.' => check_decimal_point(buffer, *pos, &mut state)?,
            b'e' | b'E' | b'-' | b'+' => check_scientific_notation(buffer, *pos, &mut state)?,
            _ => break,
        }
        *pos += 1;
    }
    Ok(())
}

fn check_decimal_point(
    buffer: &[u8],
    pos: usize,
    state: &mut NumberState,
) -> Result<(), NumericError> {
    // 1.2.3
    if state.decimal_point {
        return Err(NumericError {
            message: "double decimal point found",
            pos,
        });
    }
    // 1. or 2.g
    if pos + 1 >= buffer.len() || !buffer[pos + 1].is_ascii_digit() {
        return Err(NumericError {
            message: "decimal point must be followed by a digit",
            pos,
        });
    }
    // 1e4.5
    if state.scientific_notation {
        return Err(NumericError {
            message: "decimal point is not allowed after exponential notation",
            pos,
        });
    }
    state.decimal_point = true;
    Ok(())
}

fn check_scientific_notation(
    buffer: &[u8],
    pos: usize,
    state: &mut NumberState,
) -> Result<(), NumericError> {
    match buffer[pos] {
        b'e' | b'E' => {
            // 1e2E3
            if state.scientific_notation {
                return Err(NumericError {
                    message: "double exponential notation('e' or 'E') found",
                    pos,
                });
            }
            // 1e or 1eg
            if pos + 1 >= buffer.len() || !matches!(buffer[pos + 1], b'-' | b'+' | b'0'..=b'9') {
                return Err(NumericError {
                    message: "exponential notation must be followed by a digit or a sign",
                    pos,
                });
            }
            // Leading zeros are allowed on the exponent 1e005 evaluates to 100000
            state.scientific_notation = true;
        }
        // only '+' or '-' are left
        _ => {
            // 1+2
            if !matches!(buffer[pos - 1], b'e' | b'E') {
                return Err(NumericError {
                    message: "sign ('+' or '-') is only allowed as part of exponential notation",
                    pos,
                });
            }
            // 1E+g
            if pos + 1 >= buffer.len() || !buffer[pos + 1].is_ascii_digit() {
                return Err(NumericError {
                    message: "exponential notation must be followed by a digit",
                    pos,
                });
            }
        }
    }
    Ok(())
}
