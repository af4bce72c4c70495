/// Constructs a [Value](crate::Value) from a literal.
///
/// # Example
///
/// ```
/// # use jolt_patch::json;
/// #
/// let val = json!({
///     "Image": {
///         "Width": 800,
///         "Height": 600,
///         "Title": "View from 15th Floor",
///         "IDs": [116, 943, 234, 38793]
///     }
/// });
/// ```
///
/// This macro is intended for quickly constructing test data. Keys and values are Rust
/// expressions, nothing is parsed as JSON text, use [`from_str`](crate::from_str) or
/// [`from_slice`](crate::from_slice) for that. Every element is matched as a single token tree, so
/// negative numbers inside arrays and objects need parentheses: `json!([(-1), 2])`.
#[macro_export]
macro_rules! json {
    ([]) => { $crate::Value::from(::std::vec::Vec::<$crate::Value>::new()) };
    ({}) => { $crate::Value::from($crate::Map::new()) };
    (null) => { $crate::Value::Null };
    (true) => { $crate::Value::Bool(true) };
    (false) => { $crate::Value::Bool(false) };
    ([ $($elem:tt),+ $(,)? ]) => {
        $crate::Value::from(::std::vec![$($crate::json!($elem)),+])
    };
    ({ $($key:tt: $val:tt),+ $(,)? }) => {{
        let mut map = $crate::Map::new();
        $(map.insert(::std::string::ToString::to_string($key), $crate::json!($val));)+
        $crate::Value::from(map)
    }};
    // can only be &str, bool or some numeric type
    ($other:expr) => { $crate::Value::from($other) };
}
