use crate::json::number::Number;
use crate::json::value::{Map, Value};
use std::sync::Arc;

impl From<&str> for Value {
    // the difference between this method and jolt_patch::from_str() is that Value::from() always
    // creates Value::String() variant while from_str() can create any Value
    fn from(val: &str) -> Self {
        Value::String(val.to_owned())
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::String(val)
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

impl From<Number> for Value {
    fn from(val: Number) -> Self {
        Value::Number(val)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(Arc::new(map))
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(Arc::new(values))
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(val: $t) -> Self {
                    Value::Number(Number::from(val as i64))
                }
            }
        )+
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(val: $t) -> Self {
                    Value::Number(Number::from(val as u64))
                }
            }
        )+
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
    // f32 -> f64 is exact but 0.1f32 becomes 0.10000000149011612, go through the f32 text instead
    fn from(val: f32) -> Self {
        match val.to_string().parse::<f64>() {
            Ok(val) => Value::from(val),
            Err(_) => Value::Null,
        }
    }
}

impl From<f64> for Value {
    // NaN and the infinities have no JSON representation
    fn from(val: f64) -> Self {
        match Number::from_f64(val) {
            Some(num) => Value::Number(num),
            None => Value::Null,
        }
    }
}

// later duplicate keys overwrite the value but keep the position of the first occurrence
impl FromIterator<(String, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Value::from(iter.into_iter().collect::<Map>())
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::from(iter.into_iter().collect::<Vec<Value>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json;

    #[test]
    fn primitives() {
        let values = vec![
            (Value::from("abc"), json!("abc")),
            (Value::from(String::from("abc")), json!("abc")),
            (Value::from(true), json!(true)),
            (Value::from(-7i8), json!(-7)),
            (Value::from(u64::MAX), crate::from_str("18446744073709551615").unwrap()),
            (Value::from(0.5f32), crate::from_str("0.5").unwrap()),
            (Value::from(0.1f64), crate::from_str("0.1").unwrap()),
            (Value::from(f64::NAN), Value::Null),
            (Value::from(f64::NEG_INFINITY), Value::Null),
        ];

        for (val, expected) in values {
            assert_eq!(val, expected);
        }
    }

    #[test]
    fn collect_object_last_write_wins() {
        let val: Value = vec![
            ("a".to_string(), json!(1)),
            ("b".to_string(), json!(2)),
            ("a".to_string(), json!(3)),
        ]
        .into_iter()
        .collect();
        let map = val.as_object().unwrap();

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map["a"], json!(3));
    }

    #[test]
    fn collect_array() {
        let val: Value = (1..=3).map(Value::from).collect();

        assert_eq!(val, json!([1, 2, 3]));
    }
}
