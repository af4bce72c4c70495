use std::ops::RangeInclusive;
use thiserror::Error;

const TAIL: RangeInclusive<u8> = 0x80..=0xBF;

#[derive(Debug, PartialEq, Eq, Error)]
#[error("invalid {len} byte utf-8 sequence from index {pos}")]
pub(super) struct Utf8Error {
    pub(super) len: u8,
    pub(super) pos: usize,
}

// https://datatracker.ietf.org/doc/html/rfc3629
//
//  UTF8-2      = %xC2-DF UTF8-tail
//  UTF8-3      = %xE0 %xA0-BF UTF8-tail / %xE1-EC 2( UTF8-tail ) /
//                %xED %x80-9F UTF8-tail / %xEE-EF 2( UTF8-tail )
//  UTF8-4      = %xF0 %x90-BF 2( UTF8-tail ) / %xF1-F3 3( UTF8-tail ) /
//                %xF4 %x80-8F 2( UTF8-tail )
//  UTF8-tail   = %x80-BF
//
// Every rule is "leading byte, a 2nd byte from a range that depends on the leading byte, tail bytes"
// so for a leading byte we return the width of the sequence and the range of its 2nd byte.
// C0, C1 and F5-FF can never start a sequence, 80-BF are tail bytes.
fn sequence_rule(first: u8) -> Option<(u8, RangeInclusive<u8>)> {
    match first {
        0xC2..=0xDF => Some((2, TAIL)),
        0xE0 => Some((3, 0xA0..=0xBF)),
        // ED A0-BF would encode a surrogate
        0xED => Some((3, 0x80..=0x9F)),
        0xE1..=0xEC | 0xEE..=0xEF => Some((3, TAIL)),
        // F0 80-8F would be an overlong encoding
        0xF0 => Some((4, 0x90..=0xBF)),
        0xF1..=0xF3 => Some((4, TAIL)),
        // F4 90-BF is above U+10FFFF
        0xF4 => Some((4, 0x80..=0x8F)),
        _ => None,
    }
}

// Only called for non-ASCII leading bytes, the lexer handles the ASCII range itself. Returns the
// width of the sequence starting at pos.
pub(super) fn check_utf8_sequence(buffer: &[u8], pos: usize) -> Result<usize, Utf8Error> {
    let Some((len, second)) = sequence_rule(buffer[pos]) else {
        return Err(Utf8Error { len: 1, pos });
    };
    let err = Utf8Error { len, pos };
    let width = len as usize;

    let Some(seq) = buffer.get(pos..pos + width) else {
        return Err(err);
    };
    if !second.contains(&seq[1]) || !seq[2..].iter().all(|b| TAIL.contains(b)) {
        return Err(err);
    }
    Ok(width)
}

pub(super) fn is_bom_present(buffer: &[u8]) -> bool {
    buffer.starts_with(&[0xEF, 0xBB, 0xBF])
}
