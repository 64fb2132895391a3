use serde_json::Value;

use crate::domain::error::{RuleEngineError, TransformInputError};
use crate::domain::value_path::PathSegment;
use crate::util::text::{json_type_name, strip_whitespace, value_text};

/// Compares two extracted sequences index by index.
///
/// Returns the number of compared entries, or the first mismatch.
pub fn compare_sequences(
    source: &[Value],
    target: &[Value],
    strip_spaces: bool,
) -> Result<usize, RuleEngineError> {
    let mut compared = 0;
    for (index, (source_value, target_value)) in source.iter().zip(target).enumerate() {
        compare_entry(PathSegment::Index(index), source_value, target_value, strip_spaces)?;
        compared += 1;
    }
    Ok(compared)
}

/// Compares two documents over the source's own keys: indexes of an array or
/// fields of an object, in document order. Keys missing from the target are
/// skipped. Scalar documents are compared as a whole.
pub fn compare_documents(
    source: &Value,
    target: &Value,
    strip_spaces: bool,
) -> Result<usize, RuleEngineError> {
    match (source, target) {
        (Value::Array(source_items), Value::Array(target_items)) => {
            compare_sequences(source_items, target_items, strip_spaces)
        }
        (Value::Object(source_map), Value::Object(target_map)) => {
            let mut compared = 0;
            for (key, source_value) in source_map {
                if let Some(target_value) = target_map.get(key) {
                    compare_entry(PathSegment::Key(key.clone()), source_value, target_value, strip_spaces)?;
                    compared += 1;
                }
            }
            Ok(compared)
        }
        (Value::Array(_) | Value::Object(_), _) => Ok(0),
        _ => {
            compare_entry(PathSegment::Index(0), source, target, strip_spaces)?;
            Ok(1)
        }
    }
}

fn compare_entry(
    key: PathSegment,
    source_value: &Value,
    target_value: &Value,
    strip_spaces: bool,
) -> Result<(), RuleEngineError> {
    let equal = if strip_spaces {
        let source_text = string_operand(source_value)?;
        let target_text = string_operand(target_value)?;
        strip_whitespace(source_text) == strip_whitespace(target_text)
    } else {
        value_text(source_value).trim() == value_text(target_value).trim()
    };

    if equal {
        Ok(())
    } else {
        Err(RuleEngineError::ValueMismatch {
            key,
            source_value: source_value.clone(),
            target_value: target_value.clone(),
        })
    }
}

fn string_operand(value: &Value) -> Result<&str, TransformInputError> {
    value.as_str().ok_or(TransformInputError::NonString {
        operation: "equalValueAfterStripSpaces",
        actual: json_type_name(value),
    })
}
