use serde_json::Value;

/// String form used for trim-only comparison and prefix resolution.
///
/// Scalars render bare (`abc`, `10`, `true`, `null`); floats use the shortest
/// decimal form, so `10.0` renders as `10`. Arrays and objects render as
/// compact JSON so a transformed JSON string can match a structured target.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => match number.as_f64() {
            Some(float) if !number.is_i64() && !number.is_u64() => float.to_string(),
            _ => number.to_string(),
        },
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|ch| !ch.is_whitespace()).collect()
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
