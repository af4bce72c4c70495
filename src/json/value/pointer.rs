use crate::json::value::error::{PointerError, PointerErrorKind, Unresolvable};
use crate::json::value::reference::{Position, ReferenceChain};
use crate::json::value::Value;
use memchr::{memchr, memchr2};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

// apart from the unescaped value we also keep where the token started in the pointer text, for
// better error messaging
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RefToken {
    pub(crate) val: String,
    pub(crate) pos: usize,
}

/// A parsed RFC 6901 JSON Pointer.
///
/// Parsing splits the text on `/` and unescapes every reference token once; a pointer can then be
/// applied to any number of documents. Whether a token is an object member name or an array index
/// is only decided during resolution, when the value it is applied to is known.
///
/// # Example
///
/// ```
/// # use jolt_patch::{json, Pointer};
/// #
/// let ptr = Pointer::parse("/foo/-").unwrap();
/// let doc = json!({"foo": [1, 2]});
///
/// let updated = ptr.add(&doc, json!(3)).unwrap();
/// assert_eq!(updated, json!({"foo": [1, 2, 3]}));
/// // the original document is untouched
/// assert_eq!(doc, json!({"foo": [1, 2]}));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Pointer {
    tokens: Vec<RefToken>,
}

impl Pointer {
    /// The empty pointer, it references the whole document.
    pub fn root() -> Self {
        Pointer::default()
    }

    //  when we encounter '/' we treat it as a delimiter, and we create a token
    //
    //  if we have '/' as part of a key name we need to escape it, ~1 -> /
    //  /foo/bar evaluates to: token_1: foo, token_2: bar but /foo~1bar evaluates to token: foo/bar
    //  the order matters; if we unescape first and then split we end up with the wrong tokens
    //  /foo~1bar -> /foo/bar -> token_1: foo, token_2: bar which is incorrect
    //
    //  Splitting first and unescaping every token left to right in a single pass also handles
    //  "~01" where "~0" becomes '~' and the '1' that follows is just a '1', "~01" is "~1"
    pub fn parse(text: &str) -> Result<Pointer, PointerError> {
        if text.is_empty() {
            return Ok(Pointer::root());
        }
        if !text.starts_with('/') {
            return Err(PointerError {
                kind: PointerErrorKind::InvalidPointerSyntax,
                pos: 0,
            });
        }

        let buffer = text.as_bytes();
        let mut tokens = Vec::new();
        // skip the leading '/'
        let mut pos = 1;
        loop {
            let end = memchr(b'/', &buffer[pos..]).map_or(buffer.len(), |i| pos + i);
            // "/" and "/foo/" end with an empty token, "" is a valid member name
            let val = unescape_at(&text[pos..end], pos)?.into_owned();
            tokens.push(RefToken { val, pos });
            if end == buffer.len() {
                break;
            }
            pos = end + 1;
        }
        Ok(Pointer { tokens })
    }

    /// The unescaped reference tokens, from the root down.
    pub fn tokens(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.tokens.iter().map(|token| token.val.as_str())
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    pub(crate) fn ref_tokens(&self) -> &[RefToken] {
        &self.tokens
    }

    /// True when `other` is this pointer or one of its descendants, compared token by token.
    ///
    /// `/a` is a prefix of `/a/b` but not of `/ab` or `/a~1b`.
    pub fn is_prefix_of(&self, other: &Pointer) -> bool {
        self.tokens.len() <= other.tokens.len()
            && self
                .tokens
                .iter()
                .zip(&other.tokens)
                .all(|(a, b)| a.val == b.val)
    }

    /// Walks `target` and returns the leaf-first chain of references, see [`ReferenceChain`].
    pub fn resolve<'a, 'p>(
        &'p self,
        target: &'a Value,
    ) -> Result<ReferenceChain<'a, 'p>, PointerError> {
        ReferenceChain::resolve(self, target)
    }

    /// Returns the referenced value.
    pub fn get<'a>(&self, target: &'a Value) -> Result<&'a Value, PointerError> {
        self.resolve(target)?.get()
    }

    /// True when the pointer references an existing value. A missing member or index anywhere
    /// along the path is `false`, traversing through a scalar or an invalid array index is an error.
    pub fn contains(&self, target: &Value) -> Result<bool, PointerError> {
        match self.resolve(target) {
            Ok(chain) => Ok(chain.get().is_ok()),
            Err(err) => match &err.kind {
                PointerErrorKind::UnresolvablePath { reason }
                    if !matches!(reason, Unresolvable::Scalar { .. }) =>
                {
                    Ok(false)
                }
                _ => Err(err),
            },
        }
    }

    /// Adds `value` at the referenced location and returns the new document.
    ///
    /// A member is inserted or overwritten, an array element is inserted shifting the following
    /// elements, `-` appends. The empty pointer replaces the whole document, which must then be an
    /// object or an array.
    pub fn add(&self, target: &Value, value: Value) -> Result<Value, PointerError> {
        self.resolve(target)?.fold(|leaf| leaf.add(value))
    }

    /// Replaces the referenced value, which must exist, and returns the new document.
    pub fn replace(&self, target: &Value, value: Value) -> Result<Value, PointerError> {
        self.resolve(target)?.fold(|leaf| leaf.replace(value))
    }

    /// Removes the referenced value, which must exist, and returns the new document.
    pub fn remove(&self, target: &Value) -> Result<Value, PointerError> {
        self.resolve(target)?.fold(|leaf| leaf.remove())
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "/{}", escape_token(&token.val))?;
        }
        Ok(())
    }
}

impl FromStr for Pointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pointer::parse(s)
    }
}

/// Escapes a member name so it can be used as a reference token, `~` becomes `~0` and `/` becomes
/// `~1`.
pub fn escape_token(token: &str) -> Cow<'_, str> {
    if memchr2(b'~', b'/', token.as_bytes()).is_none() {
        return Cow::Borrowed(token);
    }
    // '~' first, otherwise the '~' of every '~1' we produce would be escaped again
    Cow::Owned(token.replace('~', "~0").replace('/', "~1"))
}

/// Reverses [`escape_token`]. A `~` that is not followed by `0` or `1` is an error.
pub fn unescape_token(token: &str) -> Result<Cow<'_, str>, PointerError> {
    unescape_at(token, 0)
}

// offset is the position of the token within the pointer text
fn unescape_at(token: &str, offset: usize) -> Result<Cow<'_, str>, PointerError> {
    let buffer = token.as_bytes();
    let Some(first) = memchr(b'~', buffer) else {
        return Ok(Cow::Borrowed(token));
    };

    let mut val = String::with_capacity(token.len());
    let mut start = 0;
    let mut tilde = Some(first);
    while let Some(i) = tilde {
        val.push_str(&token[start..i]);
        match buffer.get(i + 1) {
            Some(b'0') => val.push('~'),
            Some(b'1') => val.push('/'),
            // ~8 or a '~' ending the token
            next => {
                return Err(PointerError {
                    kind: PointerErrorKind::InvalidEscape {
                        byte: next.copied(),
                    },
                    pos: offset + i,
                })
            }
        }
        start = i + 2;
        tilde = memchr(b'~', &buffer[start..]).map(|j| start + j);
    }
    val.push_str(&token[start..]);
    Ok(Cow::Owned(val))
}

// only called when the token is applied to an array
//
// "-" is the append marker, anything else must be an unsigned base-10 integer without a sign and
// without leading zeros. An index too large for usize can never be in range, it saturates so the
// caller reports it as out of range rather than malformed.
pub(crate) fn parse_index(token: &RefToken) -> Result<Position, PointerError> {
    let invalid = |message| PointerError {
        kind: PointerErrorKind::InvalidIndex { message },
        pos: token.pos,
    };
    let bytes = token.val.as_bytes();

    match bytes {
        b"-" => return Ok(Position::Append),
        [] => return Err(invalid("array index can not be empty")),
        [b'+' | b'-', ..] => return Err(invalid("array index can not be prefixed with a sign")),
        [b'0', _, ..] => return Err(invalid("leading zeros are not allowed")),
        _ => (),
    }
    if !bytes.iter().all(u8::is_ascii_digit) {
        return Err(invalid("array index must be a non-negative integer"));
    }

    Ok(Position::Index(token.val.parse().unwrap_or(usize::MAX)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json;
    use proptest::prelude::*;

    fn valid_pointers() -> Vec<(&'static str, Vec<&'static str>)> {
        vec![
            ("", vec![]),
            ("/", vec![""]),
            ("/foo", vec!["foo"]),
            ("/foo/0", vec!["foo", "0"]),
            ("//", vec!["", ""]),
            ("/foo/", vec!["foo", ""]),
            ("/a~1b", vec!["a/b"]),
            ("/m~0n", vec!["m~n"]),
            ("/~01", vec!["~1"]),
            ("/~10", vec!["/0"]),
            ("/c%d/e^f/ ", vec!["c%d", "e^f", " "]),
            ("/🙂/-", vec!["🙂", "-"]),
        ]
    }

    fn invalid_pointers() -> Vec<(&'static str, PointerError)> {
        vec![
            (
                "foo",
                PointerError {
                    kind: PointerErrorKind::InvalidPointerSyntax,
                    pos: 0,
                },
            ),
            (
                "#/foo",
                PointerError {
                    kind: PointerErrorKind::InvalidPointerSyntax,
                    pos: 0,
                },
            ),
            (
                "/foo~2",
                PointerError {
                    kind: PointerErrorKind::InvalidEscape { byte: Some(b'2') },
                    pos: 4,
                },
            ),
            (
                "/foo/bar~",
                PointerError {
                    kind: PointerErrorKind::InvalidEscape { byte: None },
                    pos: 8,
                },
            ),
            (
                "/a~0~/b",
                PointerError {
                    kind: PointerErrorKind::InvalidEscape { byte: None },
                    pos: 4,
                },
            ),
        ]
    }

    fn invalid_indices() -> Vec<(&'static str, &'static str)> {
        vec![
            ("", "array index can not be empty"),
            ("+1", "array index can not be prefixed with a sign"),
            ("-1", "array index can not be prefixed with a sign"),
            ("--", "array index can not be prefixed with a sign"),
            ("01", "leading zeros are not allowed"),
            ("00", "leading zeros are not allowed"),
            ("1a", "array index must be a non-negative integer"),
            ("foo", "array index must be a non-negative integer"),
            ("1.0", "array index must be a non-negative integer"),
        ]
    }

    #[test]
    fn test_valid_pointers() {
        for (text, tokens) in valid_pointers() {
            let ptr = Pointer::parse(text).unwrap();

            assert_eq!(ptr.tokens().collect::<Vec<_>>(), tokens, "failed to parse: {text}");
            // Display writes the canonical form back
            assert_eq!(ptr.to_string(), text, "failed to display: {text}");
        }
    }

    #[test]
    fn test_invalid_pointers() {
        for (text, error) in invalid_pointers() {
            assert_eq!(Pointer::parse(text), Err(error), "failed to reject: {text}");
        }
    }

    #[test]
    fn token_positions() {
        let ptr = Pointer::parse("/foo//b~1ar").unwrap();
        let positions: Vec<usize> = ptr.ref_tokens().iter().map(|t| t.pos).collect();

        assert_eq!(positions, vec![1, 5, 6]);
    }

    #[test]
    fn test_invalid_indices() {
        for (val, message) in invalid_indices() {
            let token = RefToken {
                val: val.to_string(),
                pos: 3,
            };
            let err = PointerError {
                kind: PointerErrorKind::InvalidIndex { message },
                pos: 3,
            };

            assert_eq!(parse_index(&token), Err(err), "failed to reject: {val}");
        }
    }

    #[test]
    fn valid_indices() {
        let index = |val: &str| {
            parse_index(&RefToken {
                val: val.to_string(),
                pos: 1,
            })
        };

        assert_eq!(index("-"), Ok(Position::Append));
        assert_eq!(index("0"), Ok(Position::Index(0)));
        assert_eq!(index("10"), Ok(Position::Index(10)));
        assert_eq!(
            index("99999999999999999999999999"),
            Ok(Position::Index(usize::MAX))
        );
    }

    #[test]
    fn escape_round_trip() {
        let names = vec!["", "plain", "a/b", "m~n", "~1", "/~0/", "~~//"];

        for name in names {
            let escaped = escape_token(name);
            assert_eq!(unescape_token(&escaped).unwrap(), name);
        }
        assert_eq!(escape_token("~1"), "~01");
        assert!(matches!(escape_token("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn prefix_compares_tokens() {
        let ptr = |text| Pointer::parse(text).unwrap();

        assert!(ptr("/a").is_prefix_of(&ptr("/a/b")));
        assert!(ptr("/a").is_prefix_of(&ptr("/a")));
        assert!(ptr("").is_prefix_of(&ptr("/a")));
        assert!(!ptr("/a").is_prefix_of(&ptr("/ab")));
        assert!(!ptr("/a").is_prefix_of(&ptr("/a~1b")));
        assert!(!ptr("/a/b").is_prefix_of(&ptr("/a")));
    }

    // RFC 6901 section 5
    fn rfc6901_example() -> Value {
        crate::from_str(
            r#"{
                "foo": ["bar", "baz"],
                "": 0,
                "a/b": 1,
                "c%d": 2,
                "e^f": 3,
                "g|h": 4,
                "i\\j": 5,
                "k\"l": 6,
                " ": 7,
                "m~n": 8,
                "p": {"q": 9},
                "s": [{"t": 10}],
                "o": null
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn rfc6901_get() {
        let doc = rfc6901_example();
        let cases = vec![
            ("", doc.clone()),
            ("/foo", json!(["bar", "baz"])),
            ("/foo/0", json!("bar")),
            ("/", json!(0)),
            ("/a~1b", json!(1)),
            ("/c%d", json!(2)),
            ("/e^f", json!(3)),
            ("/g|h", json!(4)),
            ("/i\\j", json!(5)),
            ("/k\"l", json!(6)),
            ("/ ", json!(7)),
            ("/m~0n", json!(8)),
            ("/s/0/t", json!(10)),
            ("/o", json!(null)),
        ];

        for (text, expected) in cases {
            let ptr = Pointer::parse(text).unwrap();
            assert_eq!(ptr.get(&doc), Ok(&expected), "failed to get: {text}");
        }
    }

    #[test]
    fn rfc6901_contains() {
        let doc = rfc6901_example();
        let cases = vec![
            ("", true),
            ("/foo/1", true),
            ("/foo/5", false),
            ("/foo/-", false),
            ("/p/1", false),
            ("/p/q", true),
            ("/notexists", false),
            ("/notexists/deeper", false),
            ("/s/0/t", true),
            ("/o", true),
        ];

        for (text, expected) in cases {
            let ptr = Pointer::parse(text).unwrap();
            assert_eq!(ptr.contains(&doc), Ok(expected), "failed on: {text}");
        }
    }

    #[test]
    fn contains_errors() {
        let doc = rfc6901_example();

        // "t" is not an array index
        let err = Pointer::parse("/s/t").unwrap().contains(&doc).unwrap_err();
        assert!(err.is_malformed());
        assert_eq!(err.pos, 3);

        // 9 is a number
        let err = Pointer::parse("/p/q/r").unwrap().contains(&doc).unwrap_err();
        assert_eq!(
            err.kind,
            PointerErrorKind::UnresolvablePath {
                reason: Unresolvable::Scalar { value_type: "number" }
            }
        );
    }

    #[test]
    fn value_pointer_helper() {
        let doc = rfc6901_example();

        assert_eq!(doc.pointer("/foo/1"), Ok(&json!("baz")));
        assert!(doc.pointer("foo").unwrap_err().is_malformed());
    }

    proptest! {
        #[test]
        fn escaped_tokens_unescape_back(name in any::<String>()) {
            let escaped = escape_token(&name);
            prop_assert_eq!(unescape_token(&escaped).unwrap(), name.as_str());

            // a pointer built from the escaped name has exactly that name as its only token
            let ptr = Pointer::parse(&format!("/{escaped}")).unwrap();
            prop_assert_eq!(ptr.tokens().collect::<Vec<_>>(), vec![name.as_str()]);
        }
    }
}
