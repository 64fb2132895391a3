use serde_json::Value;
use tracing::debug;

use crate::domain::error::{RuleEngineError, TransformInputError};
use crate::domain::mapping::{TimeFormat, TransformChain, TransformStep};
use crate::engine::{extract, hours};
use crate::util::text::{json_type_name, value_text};

/// Threads `value` through every step of `chain`, in order.
///
/// `element` is the array element the value was read from; `removePreText`
/// resolves its prefix address against it.
pub fn transform_data(
    chain: &TransformChain,
    value: Value,
    element: &Value,
) -> Result<Value, RuleEngineError> {
    chain
        .steps()
        .iter()
        .try_fold(value, |current, step| {
            debug!(step = step.name(), "applying transformation");
            apply_step(step, current, element)
        })
}

fn apply_step(step: &TransformStep, value: Value, element: &Value) -> Result<Value, RuleEngineError> {
    match step {
        TransformStep::RemovePreText(address) => {
            let wrapped = Value::Array(vec![element.clone()]);
            let resolved = extract::get_path_value(address, None, &wrapped)?;
            let prefix = resolved.iter().map(value_text).collect::<Vec<_>>().join(",");
            let text = expect_string("removePreText", &value)?;
            Ok(Value::String(remove_pre_text(text, &prefix)))
        }
        TransformStep::TimeFormatChange(TimeFormat::StoreHours) => {
            let text = expect_string("storeHoursTransformation", &value)?;
            Ok(Value::String(hours::expand_weekly_hours(text)?))
        }
        TransformStep::TimeFormatChange(TimeFormat::Other(name)) => {
            debug!(format = %name, "no time format transform registered; value unchanged");
            Ok(value)
        }
        TransformStep::Unrecognized(name) => {
            debug!(transform = %name, "ignoring unrecognized transformation rule");
            Ok(value)
        }
    }
}

/// Removes the first occurrence of `prefix` from `text`.
pub fn remove_pre_text(text: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return text.to_string();
    }
    text.replacen(prefix, "", 1)
}

fn expect_string<'a>(operation: &'static str, value: &'a Value) -> Result<&'a str, TransformInputError> {
    value.as_str().ok_or(TransformInputError::NonString {
        operation,
        actual: json_type_name(value),
    })
}
