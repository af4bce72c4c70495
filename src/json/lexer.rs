use super::error::{ParseError, ParseErrorKind, StringError, StringErrorKind};
use super::{escapes, number, utf8};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(super) enum TokenKind {
    LCurlyBracket,
    RCurlyBracket,
    LSquareBracket,
    RSquareBracket,
    Colon,
    Comma,
    Number,
    String,
    Boolean,
    Null,
}

// [start, end) range of the token in the input buffer
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(super) struct Token {
    pub(super) kind: TokenKind,
    start: usize,
    end: usize,
}

impl Token {
    fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    pub(super) fn start(&self) -> usize {
        self.start
    }

    pub(super) fn end(&self) -> usize {
        self.end
    }
}

pub(super) struct Lexer<'a> {
    buffer: &'a [u8],
    pub(super) pos: usize,
}

impl<'a> Lexer<'a> {
    pub(super) fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    pub(super) fn advance_by(&mut self, n: usize) {
        self.pos += n;
    }

    // returns the next token, None once only whitespaces are left
    pub(super) fn lex(&mut self) -> Result<Option<Token>, ParseError> {
        super::skip_whitespaces(self.buffer, &mut self.pos);
        if self.pos >= self.buffer.len() {
            return Ok(None);
        }

        let start = self.pos;
        let current = self.buffer[self.pos];
        let kind = match current {
            b'{' => self.single(TokenKind::LCurlyBracket),
            b'}' => self.single(TokenKind::RCurlyBracket),
            b'[' => self.single(TokenKind::LSquareBracket),
            b']' => self.single(TokenKind::RSquareBracket),
            b':' => self.single(TokenKind::Colon),
            b',' => self.single(TokenKind::Comma),
            b'-' | b'+' | b'0'..=b'9' => {
                number::read(self.buffer, &mut self.pos)?;
                TokenKind::Number
            }
            b'"' => {
                self.read_string()?;
                TokenKind::String
            }
            b't' => {
                self.read_literal(b"true")?;
                TokenKind::Boolean
            }
            b'f' => {
                self.read_literal(b"false")?;
                TokenKind::Boolean
            }
            b'n' => {
                self.read_literal(b"null")?;
                TokenKind::Null
            }
            _ => {
                return Err(ParseError {
                    kind: ParseErrorKind::UnexpectedCharacter { byte: current },
                    pos: self.pos,
                })
            }
        };
        Ok(Some(Token::new(kind, start, self.pos)))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    // after reading, pos is at the first byte after the closing quote
    fn read_string(&mut self) -> Result<(), StringError> {
        let len = self.buffer.len();
        self.pos += 1; // skip opening "

        while self.pos < len && self.buffer[self.pos] != b'"' {
            let current = self.buffer[self.pos];
            match current {
                // raw control characters are not allowed
                // [34, 10, 34] is invalid - the control character is passed as raw byte, and it is unescaped
                // but [34, 92, 110, 34] should be considered valid as a new line character
                c if c < 0x20 => {
                    return Err(StringError {
                        kind: StringErrorKind::InvalidControlCharacter { byte: current },
                        pos: self.pos,
                    });
                }
                c if !c.is_ascii() => {
                    self.pos += utf8::check_utf8_sequence(self.buffer, self.pos)?;
                }
                b'\\' => {
                    escapes::check_escape_character(self.buffer, self.pos)?;
                    self.pos += escapes::len(self.buffer, self.pos);
                }
                _ => self.pos += 1,
            }
        }
        if self.pos >= len {
            return Err(StringError {
                kind: StringErrorKind::UnexpectedEof,
                pos: len - 1,
            });
        }
        self.pos += 1; // skip closing "
        Ok(())
    }

    // an approach with starts_with() could work but in the case of mismatch we won't know the index
    fn read_literal(&mut self, target: &[u8]) -> Result<(), ParseError> {
        for byte in target {
            match self.buffer.get(self.pos) {
                Some(current) if current == byte => self.pos += 1,
                Some(&current) => {
                    return Err(ParseError {
                        kind: ParseErrorKind::UnexpectedCharacter { byte: current },
                        pos: self.pos,
                    })
                }
                None => {
                    return Err(ParseError {
                        kind: ParseErrorKind::UnexpectedEof,
                        pos: self.buffer.len() - 1,
                    })
                }
            }
        }
        Ok(())
    }
}
