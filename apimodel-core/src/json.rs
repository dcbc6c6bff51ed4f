//! Helpers over raw JSON values.

use serde_json::Value as JsonValue;

/// Whether a raw value counts as empty: `null`, `""`, `[]` or `{}`.
///
/// `0`, `0.0` and `false` are not empty.
pub fn is_empty_json(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
        JsonValue::Bool(_) | JsonValue::Number(_) => false,
    }
}

/// Type name of a raw value as used in error messages.
pub fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(n) if n.is_f64() => "float",
        JsonValue::Number(_) => "integer",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(null), true)]
    #[case(json!(""), true)]
    #[case(json!([]), true)]
    #[case(json!({}), true)]
    #[case(json!(0), false)]
    #[case(json!(0.0), false)]
    #[case(json!(false), false)]
    #[case(json!(" "), false)]
    #[case(json!([null]), false)]
    fn test_is_empty_json(#[case] value: JsonValue, #[case] expected: bool) {
        assert_eq!(is_empty_json(&value), expected);
    }

    #[rstest]
    #[case(json!(1), "integer")]
    #[case(json!(-1), "integer")]
    #[case(json!(1.5), "float")]
    #[case(json!("x"), "string")]
    #[case(json!({"a": 1}), "object")]
    fn test_json_type_name(#[case] value: JsonValue, #[case] expected: &str) {
        assert_eq!(json_type_name(&value), expected);
    }
}
