use crate::json::error::ParseError;
use crate::json::parse::Parser;
use crate::json::value::Value;

pub(super) mod error;
mod escapes;
mod lexer;
pub(super) mod number;
mod parse;
mod utf8;
pub(super) mod value;
mod write;

//implementation limits: https://www.ibm.com/docs/en/datapower-gateway/10.6.0?topic=20-json-parser-limits
pub const INPUT_BUFFER_LIMIT: usize = 5_242_880;
// the number of bytes in the String after parsing
pub const STRING_LENGTH_LIMIT: usize = 8192;
pub const NESTING_DEPTH_LIMIT: u16 = 128;

pub(super) fn parse(buffer: &[u8]) -> Result<Value, ParseError> {
    Parser::new(buffer).parse()
}

fn is_rfc_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\r' | b' ')
}

fn skip_whitespaces(buffer: &[u8], pos: &mut usize) {
    while *pos < buffer.len() && is_rfc_whitespace(buffer[*pos]) {
        *pos += 1;
    }
}
