use super::error::{ParseError, ParseErrorKind};
use super::lexer::{Lexer, Token, TokenKind};
use super::value::{Map, Value};
use super::{escapes, number, utf8};
use memchr::memchr;
use std::sync::Arc;

enum Action {
    Continue,
    Break,
}

pub(super) struct Parser<'a> {
    buffer: &'a [u8],
    lexer: Lexer<'a>,
    depth: u16,
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    pub(super) fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            lexer: Lexer::new(buffer),
            depth: 0,
            peeked: None,
        }
    }

    pub(super) fn parse(&mut self) -> Result<Value, ParseError> {
        // [](empty input buffer) is invalid, JsonText = ws value ws, a value is mandatory
        if self.buffer.is_empty() {
            return Err(ParseError {
                kind: ParseErrorKind::UnexpectedEof,
                pos: 0,
            });
        }
        if self.buffer.len() > super::INPUT_BUFFER_LIMIT {
            return Err(ParseError {
                kind: ParseErrorKind::InputBufferLimitExceeded {
                    len: super::INPUT_BUFFER_LIMIT,
                },
                pos: 0,
            });
        }
        // https://www.rfc-editor.org/rfc/rfc8259#section-8.1
        if utf8::is_bom_present(self.buffer) {
            self.lexer.advance_by(3);
        }

        let val = self.parse_value()?;
        // after successfully parsing a value we can't have leftover tokens
        // false5, "abc"123, {}  null,
        if let Some(token) = self.peek()? {
            return Err(ParseError {
                kind: ParseErrorKind::UnexpectedToken { expected: None },
                pos: token.start(),
            });
        }
        Ok(val)
    }

    // this method peeks to determine which method to call to parse the corresponding value. The
    // method that parses a value is responsible for consuming the tokens that make up that value.
    //
    // parse_object() consumes '{' up to and including '}'
    // parse_array() consumes '[' up to and including ']'
    // strings, numbers, booleans and null are a single token; they use the token range to read
    // the value from the buffer.
    //
    // After parsing a value, peek() references the next token after it
    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let Some(&token) = self.peek()? else {
            return Err(self.eof());
        };

        let val = match token.kind {
            TokenKind::LCurlyBracket => Value::Object(Arc::new(self.parse_object()?)),
            TokenKind::LSquareBracket => Value::Array(Arc::new(self.parse_array()?)),
            TokenKind::Number => {
                self.next()?;
                Value::Number(self.parse_number(token)?)
            }
            TokenKind::String => {
                self.next()?;
                Value::String(self.parse_string(token)?)
            }
            TokenKind::Boolean => {
                self.next()?;
                Value::Bool(self.buffer[token.start()] == b't')
            }
            TokenKind::Null => {
                self.next()?;
                Value::Null
            }
            _ => {
                return Err(ParseError {
                    kind: ParseErrorKind::UnexpectedToken {
                        expected: Some("json value"),
                    },
                    pos: token.start(),
                });
            }
        };
        Ok(val)
    }

    // read parse_value()
    fn parse_object(&mut self) -> Result<Map, ParseError> {
        self.next()?; // Consume '{'
        self.check_depth()?;
        self.depth += 1;
        let mut map = Map::new();

        // Case: empty object {}
        match self.peek()? {
            Some(token) if token.kind == TokenKind::RCurlyBracket => {
                self.next()?;
                self.depth -= 1;
                return Ok(map);
            }
            Some(_) => (),
            None => return Err(self.eof()),
        }

        // We don't know how many tokens are part of the current object, the moment we encounter '}'
        // we break
        loop {
            // copy the token out of peek(), the borrow has to end before we call parse_string()
            let Some(&token) = self.peek()? else {
                return Err(self.eof());
            };
            if token.kind != TokenKind::String {
                return Err(ParseError {
                    kind: ParseErrorKind::UnexpectedToken {
                        expected: Some("object name"),
                    },
                    pos: token.start(),
                });
            }
            self.next()?;
            let name = self.parse_string(token)?;
            self.expect_colon()?;
            // {"key": false, "key": true} the last value wins, the key keeps its first position
            let val = self.parse_value()?;
            map.insert(name, val);

            // expect Comma to separate key-value pairs or '}' to end current object
            match self.expect_comma_or_end("string key", TokenKind::RCurlyBracket)? {
                Action::Continue => (),
                Action::Break => break,
            }
        }
        Ok(map)
    }

    // read parse_value()
    fn parse_array(&mut self) -> Result<Vec<Value>, ParseError> {
        self.next()?; // Consume '['
        self.check_depth()?;
        self.depth += 1;
        let mut arr = Vec::new();

        // Case: empty array []
        match self.peek()? {
            Some(token) if token.kind == TokenKind::RSquareBracket => {
                self.next()?;
                self.depth -= 1;
                return Ok(arr);
            }
            Some(_) => (),
            None => return Err(self.eof()),
        }

        // when we encounter ']' we break
        loop {
            arr.push(self.parse_value()?);
            match self.expect_comma_or_end("json value", TokenKind::RSquareBracket)? {
                Action::Continue => (),
                Action::Break => break,
            }
        }
        Ok(arr)
    }

    // the lexer already validated the string, the only error left is exceeding the length limit
    fn parse_string(&self, token: Token) -> Result<String, ParseError> {
        let slice = &self.buffer[token.start() + 1..token.end() - 1];
        let mut val = String::with_capacity(slice.len());
        let mut i = 0;

        while i < slice.len() {
            let j = i;
            // find the chunk that does not contain any escape that needs special handling
            i = memchr(b'\\', &slice[i..]).map_or(slice.len(), |k| i + k);
            // if it contains at least 1 character parse it
            if i > j {
                // SAFETY: lexer already verified the sequence
                val.push_str(unsafe { std::str::from_utf8_unchecked(&slice[j..i]) });
            }
            if i >= slice.len() {
                break;
            }
            // can only be an escape
            val.push(escapes::map_escape_character(slice, i));
            i += escapes::len(slice, i);
        }

        if val.len() > super::STRING_LENGTH_LIMIT {
            return Err(ParseError {
                kind: ParseErrorKind::StringLengthLimitExceeded {
                    len: super::STRING_LENGTH_LIMIT,
                },
                pos: token.start(),
            });
        }
        Ok(val)
    }

    fn parse_number(&self, token: Token) -> Result<super::number::Number, ParseError> {
        let slice = &self.buffer[token.start()..token.end()];
        number::parse(slice).map_err(|err| ParseError {
            kind: ParseErrorKind::InvalidNumber {
                message: err.message,
            },
            pos: token.start(),
        })
    }

    fn expect_colon(&mut self) -> Result<(), ParseError> {
        match self.peek()? {
            Some(token) if token.kind == TokenKind::Colon => {
                self.next()?;
                Ok(())
            }
            // mismatch
            Some(token) => Err(ParseError {
                kind: ParseErrorKind::UnexpectedToken {
                    expected: Some("colon ':'"),
                },
                pos: token.start(),
            }),
            None => Err(self.eof()),
        }
    }

    fn check_depth(&self) -> Result<(), ParseError> {
        if self.depth + 1 > super::NESTING_DEPTH_LIMIT {
            return Err(ParseError {
                kind: ParseErrorKind::NestingDepthLimitExceeded {
                    depth: super::NESTING_DEPTH_LIMIT,
                },
                pos: self.lexer.pos,
            });
        }
        Ok(())
    }

    fn expect_comma_or_end(
        &mut self,
        expected: &'static str,
        bracket: TokenKind,
    ) -> Result<Action, ParseError> {
        let Some(&token) = self.peek()? else {
            return Err(self.eof());
        };

        match token.kind {
            TokenKind::Comma => {
                self.next()?;
                // Case: {"foo": "bar",}
                if let Some(next) = self.peek()? {
                    if next.kind == bracket {
                        return Err(ParseError {
                            kind: ParseErrorKind::UnexpectedToken {
                                expected: Some(expected),
                            },
                            pos: next.start(),
                        });
                    }
                }
                // if we don't encounter a closing bracket or peek() returned None, continue and let
                // parse_value() handle it
                Ok(Action::Continue)
            }
            t if t == bracket => {
                self.next()?; // Consume '}' or ']'
                self.depth -= 1;
                Ok(Action::Break)
            }
            // mismatch
            _ => Err(ParseError {
                kind: ParseErrorKind::UnexpectedToken {
                    expected: Some("',' or closing bracket"),
                },
                pos: token.start(),
            }),
        }
    }

    fn eof(&self) -> ParseError {
        ParseError {
            kind: ParseErrorKind::UnexpectedEof,
            pos: self.buffer.len().saturating_sub(1),
        }
    }

    fn peek(&mut self) -> Result<Option<&Token>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.lex()?;
        }
        Ok(self.peeked.as_ref())
    }

    fn next(&mut self) -> Result<Option<Token>, ParseError> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => self.lexer.lex(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json;
    use crate::json::number::Number;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn invalid_objects() -> Vec<(&'static [u8], ParseError)> {
        vec![
            (
                b"{",
                ParseError {
                    kind: ParseErrorKind::UnexpectedEof,
                    pos: 0,
                },
            ),
            (
                b"{ null : 1 }",
                ParseError {
                    kind: ParseErrorKind::UnexpectedToken {
                        expected: Some("object name"),
                    },
                    pos: 2,
                },
            ),
            (
                b"{ \"foo\": 5,",
                ParseError {
                    kind: ParseErrorKind::UnexpectedEof,
                    pos: 10,
                },
            ),
            (
                b"{ \"foo\": 5",
                ParseError {
                    kind: ParseErrorKind::UnexpectedEof,
                    pos: 9,
                },
            ),
            (
                b"{ \"foo\": 5,}",
                ParseError {
                    kind: ParseErrorKind::UnexpectedToken {
                        expected: Some("string key"),
                    },
                    pos: 11,
                },
            ),
            (
                b"{ \"foo\": 5 null",
                ParseError {
                    kind: ParseErrorKind::UnexpectedToken {
                        expected: Some("',' or closing bracket"),
                    },
                    pos: 11,
                },
            ),
            (
                b"{ \"foo\"",
                ParseError {
                    kind: ParseErrorKind::UnexpectedEof,
                    pos: 6,
                },
            ),
            (
                b"{ \"foo\" 3",
                ParseError {
                    kind: ParseErrorKind::UnexpectedToken {
                        expected: Some("colon ':'"),
                    },
                    pos: 8,
                },
            ),
            (
                b"{ \"foo\": \"value\" } 123",
                ParseError {
                    kind: ParseErrorKind::UnexpectedToken { expected: None },
                    pos: 19,
                },
            ),
        ]
    }

    fn invalid_arrays() -> Vec<(&'static [u8], ParseError)> {
        vec![
            (
                b"[",
                ParseError {
                    kind: ParseErrorKind::UnexpectedEof,
                    pos: 0,
                },
            ),
            (
                b"[116, 943",
                ParseError {
                    kind: ParseErrorKind::UnexpectedEof,
                    pos: 8,
                },
            ),
            (
                b"[116, 943,",
                ParseError {
                    kind: ParseErrorKind::UnexpectedEof,
                    pos: 9,
                },
            ),
            (
                b"[116 true]",
                ParseError {
                    kind: ParseErrorKind::UnexpectedToken {
                        expected: Some("',' or closing bracket"),
                    },
                    pos: 5,
                },
            ),
            (
                b"[:]",
                ParseError {
                    kind: ParseErrorKind::UnexpectedToken {
                        expected: Some("json value"),
                    },
                    pos: 1,
                },
            ),
            (
                b"[1,]",
                ParseError {
                    kind: ParseErrorKind::UnexpectedToken {
                        expected: Some("json value"),
                    },
                    pos: 3,
                },
            ),
        ]
    }

    #[test]
    fn test_invalid_objects() {
        for (buffer, error) in invalid_objects() {
            let mut parser = Parser::new(buffer);
            let result = parser.parse();

            assert_eq!(result, Err(error), "failed to parse: {buffer:?}");
        }
    }

    #[test]
    fn test_invalid_arrays() {
        for (buffer, error) in invalid_arrays() {
            let mut parser = Parser::new(buffer);
            let result = parser.parse();

            assert_eq!(result, Err(error), "failed to parse: {buffer:?}");
        }
    }

    #[test]
    fn valid_object() {
        // can't use br## because 🙂 is a Non ASCII character, empty strings as keys are allowed
        let buffer = r#"{
            "4_byte_sequence": "🙂",
            "surrogate_pair": "\uD83D\uDE00",
            "escape_characters": "\\\"\/\b\f\n\r\t",
            "boolean" : false,
            "numbers": [116, -943, 9007199254740991, -3.14159265358979e+100, 0.1, 340282366920938463463374607431768211456],
            "": true,
            "null": null
        }"#
        .as_bytes();

        let numbers: Vec<Value> = vec![
            Value::Number(Number::from(116i64)),
            Value::Number(Number::from(-943i64)),
            Value::Number(Number::from(9007199254740991i64)),
            Value::Number(Number::from(
                BigDecimal::from_str("-3.14159265358979e+100").unwrap(),
            )),
            Value::Number(Number::from(BigDecimal::from_str("0.1").unwrap())),
            Value::Number(Number::from(
                BigDecimal::from_str("340282366920938463463374607431768211456").unwrap(),
            )),
        ];

        let mut map = Map::new();
        map.insert("4_byte_sequence".to_string(), Value::from("🙂"));
        // the "Grinning Face" emoji, codepoint U+1F600
        map.insert("surrogate_pair".to_string(), Value::from("😀"));
        map.insert(
            "escape_characters".to_string(),
            Value::from("\\\"/\x08\x0C\n\r\t"),
        );
        map.insert("boolean".to_string(), Value::Bool(false));
        map.insert("numbers".to_string(), Value::from(numbers));
        map.insert("".to_string(), Value::Bool(true));
        map.insert("null".to_string(), Value::Null);

        let mut parser = Parser::new(buffer);
        let result = parser.parse().unwrap();

        assert_eq!(Value::from(map), result);
    }

    #[test]
    fn duplicate_names_last_write_wins() {
        let buffer = br#"{"foo": "bar", "baz": 1, "foo": "qux"}"#;
        let mut parser = Parser::new(buffer);
        let result = parser.parse().unwrap();
        let object = result.as_object().unwrap();

        assert_eq!(object.len(), 2);
        assert_eq!(object.get_index(0), Some((&"foo".to_string(), &Value::from("qux"))));
        assert_eq!(object.get_index(1), Some((&"baz".to_string(), &Value::from(1))));
    }

    #[test]
    fn skips_bom() {
        let buffer = b"\xEF\xBB\xBF[true]";
        let mut parser = Parser::new(buffer);

        assert_eq!(parser.parse(), Ok(json!([true])));
    }

    #[test]
    fn empty_input() {
        let buffer = [];
        let mut parser = Parser::new(&buffer);
        let error = ParseError {
            kind: ParseErrorKind::UnexpectedEof,
            pos: 0,
        };

        assert_eq!(parser.parse(), Err(error));
    }

    #[test]
    fn only_whitespaces() {
        // \t, \n, \r, ' '
        let buffer: [u8; 4] = [9, 10, 13, 32];
        let mut parser = Parser::new(&buffer);
        let error = ParseError {
            kind: ParseErrorKind::UnexpectedEof,
            pos: 3,
        };

        assert_eq!(parser.parse(), Err(error));
    }

    #[test]
    fn empty_containers() {
        assert_eq!(Parser::new(b"{}").parse(), Ok(Value::from(Map::new())));
        assert_eq!(Parser::new(b"[]").parse(), Ok(Value::from(Vec::new())));
    }

    // a stack allocated buffer of this size could overflow the test thread's stack
    #[test]
    fn input_buffer_exceeds_size_limit() {
        let buffer = vec![b'"'; json::INPUT_BUFFER_LIMIT + 1];
        let mut parser = Parser::new(&buffer);

        assert_eq!(
            parser.parse(),
            Err(ParseError {
                kind: ParseErrorKind::InputBufferLimitExceeded {
                    len: json::INPUT_BUFFER_LIMIT
                },
                pos: 0
            })
        );
    }

    #[test]
    fn string_len_exceeds_limit() {
        let mut buffer = Vec::with_capacity(json::STRING_LENGTH_LIMIT + 3);
        buffer.push(b'"');
        buffer.extend(vec![b'a'; json::STRING_LENGTH_LIMIT + 1]);
        buffer.push(b'"');
        let mut parser = Parser::new(&buffer);

        assert_eq!(
            parser.parse(),
            Err(ParseError {
                kind: ParseErrorKind::StringLengthLimitExceeded {
                    len: json::STRING_LENGTH_LIMIT
                },
                pos: 0
            })
        );
    }

    #[test]
    fn exceeds_depth_limit() {
        let text = format!("{}{}", "[".repeat(257), "]".repeat(257));
        let mut parser = Parser::new(text.as_bytes());

        assert_eq!(
            parser.parse(),
            Err(ParseError {
                kind: ParseErrorKind::NestingDepthLimitExceeded {
                    depth: json::NESTING_DEPTH_LIMIT
                },
                // the lexer is past the '[' that would exceed the limit
                pos: json::NESTING_DEPTH_LIMIT as usize + 1
            })
        );
    }
}
