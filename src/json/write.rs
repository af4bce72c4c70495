use super::value::Value;
use std::fmt::{self, Write};

const INDENT: usize = 2;

// `{}` writes compact text, `{:#}` writes members and elements on their own lines
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write_pretty(f, self, 0)
        } else {
            write_compact(f, self)
        }
    }
}

fn write_compact(f: &mut fmt::Formatter<'_>, val: &Value) -> fmt::Result {
    match val {
        Value::Object(map) => {
            f.write_char('{')?;
            for (i, (key, val)) in map.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                write_string(f, key)?;
                f.write_char(':')?;
                write_compact(f, val)?;
            }
            f.write_char('}')
        }
        Value::Array(values) => {
            f.write_char('[')?;
            for (i, val) in values.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                write_compact(f, val)?;
            }
            f.write_char(']')
        }
        _ => write_scalar(f, val),
    }
}

fn write_pretty(f: &mut fmt::Formatter<'_>, val: &Value, indent: usize) -> fmt::Result {
    match val {
        Value::Object(map) if !map.is_empty() => {
            f.write_str("{\n")?;
            for (i, (key, val)) in map.iter().enumerate() {
                if i > 0 {
                    f.write_str(",\n")?;
                }
                write_indent(f, indent + INDENT)?;
                write_string(f, key)?;
                f.write_str(": ")?;
                write_pretty(f, val, indent + INDENT)?;
            }
            f.write_char('\n')?;
            write_indent(f, indent)?;
            f.write_char('}')
        }
        Value::Array(values) if !values.is_empty() => {
            f.write_str("[\n")?;
            for (i, val) in values.iter().enumerate() {
                if i > 0 {
                    f.write_str(",\n")?;
                }
                write_indent(f, indent + INDENT)?;
                write_pretty(f, val, indent + INDENT)?;
            }
            f.write_char('\n')?;
            write_indent(f, indent)?;
            f.write_char(']')
        }
        // {} and [] stay on one line
        _ => write_compact(f, val),
    }
}

fn write_scalar(f: &mut fmt::Formatter<'_>, val: &Value) -> fmt::Result {
    match val {
        Value::Number(num) => write!(f, "{num}"),
        Value::String(s) => write_string(f, s),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Null => f.write_str("null"),
        Value::Object(_) | Value::Array(_) => write_compact(f, val),
    }
}

fn write_indent(f: &mut fmt::Formatter<'_>, n: usize) -> fmt::Result {
    write!(f, "{:n$}", "")
}

// https://www.rfc-editor.org/rfc/rfc8259#section-7
fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    let mut start = 0;
    for (i, byte) in s.bytes().enumerate() {
        let escape = match byte {
            b'"' => "\\\"",
            b'\\' => "\\\\",
            b'\n' => "\\n",
            b'\r' => "\\r",
            b'\t' => "\\t",
            0x08 => "\\b",
            0x0C => "\\f",
            0x00..=0x1F => "",
            _ => continue,
        };
        // flush the chunk that needs no escaping, every escaped byte is ASCII so i is a char boundary
        f.write_str(&s[start..i])?;
        if escape.is_empty() {
            write!(f, "\\u{byte:04X}")?;
        } else {
            f.write_str(escape)?;
        }
        start = i + 1;
    }
    f.write_str(&s[start..])?;
    f.write_char('"')
}

#[cfg(test)]
mod tests {
    use crate::json;
    use crate::json::value::strategy::arb_value;
    use crate::json::value::Value;
    use proptest::prelude::*;

    fn compact() -> Vec<(Value, &'static str)> {
        vec![
            (json!(null), "null"),
            (json!(true), "true"),
            (json!(-943), "-943"),
            (crate::from_str("0.1").unwrap(), "0.1"),
            (json!("a\"b\\c/d"), r#""a\"b\\c/d""#),
            (json!("\n\t\u{8}\u{c}\u{1}"), r#""\n\t\b\f\u0001""#),
            (json!("🙂"), "\"🙂\""),
            (json!([]), "[]"),
            (json!({}), "{}"),
            (json!([1, [2, {}], "x"]), r#"[1,[2,{}],"x"]"#),
            (json!({"b": 1, "a": [true, null]}), r#"{"b":1,"a":[true,null]}"#),
        ]
    }

    #[test]
    fn test_compact() {
        for (val, expected) in compact() {
            assert_eq!(val.to_string(), expected);
        }
    }

    #[test]
    fn pretty() {
        let val = json!({"a": [1, {"b": null}], "c": {}, "d": []});
        let expected = "{\n  \"a\": [\n    1,\n    {\n      \"b\": null\n    }\n  ],\n  \"c\": {},\n  \"d\": []\n}";

        assert_eq!(format!("{val:#}"), expected);
    }

    #[test]
    fn round_trip() {
        let text = r#"{"name":"jolt","tags":["a","b\u0000"],"n":1.5e300,"big":340282366920938463463374607431768211456,"nested":{"k":[{}]}}"#;
        let val = crate::from_str(text).unwrap();

        assert_eq!(crate::from_str(&val.to_string()).unwrap(), val);
        assert_eq!(crate::from_str(&format!("{val:#}")).unwrap(), val);
    }

    proptest! {
        #[test]
        fn written_text_parses_back(val in arb_value()) {
            prop_assert_eq!(crate::from_str(&val.to_string()), Ok(val.clone()));
            prop_assert_eq!(crate::from_str(&format!("{val:#}")), Ok(val));
        }
    }
}
