use serde::Serialize;
use serde_json::{Value, json};

use crate::engine::hours;

/// Structured response of the `hours` command.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HoursCommandResponse {
    pub exit_code: i32,
    pub payload: Value,
}

/// Expands a compressed business-hours string into per-day records.
pub fn run(text: &str) -> HoursCommandResponse {
    let records = match hours::parse_weekly_hours(text) {
        Ok(records) => records,
        Err(error) => {
            return HoursCommandResponse {
                exit_code: 3,
                payload: json!({
                    "error": "input_usage_error",
                    "message": error.to_string(),
                }),
            };
        }
    };
    match serde_json::to_value(&records) {
        Ok(payload) => HoursCommandResponse {
            exit_code: 0,
            payload,
        },
        Err(error) => HoursCommandResponse {
            exit_code: 1,
            payload: json!({
                "error": "internal_error",
                "message": format!("failed to serialize business hours: {error}"),
            }),
        },
    }
}

pub fn pipeline_steps() -> Vec<String> {
    vec![
        "split_segments".to_string(),
        "expand_day_ranges".to_string(),
        "convert_12h_to_24h".to_string(),
    ]
}

pub fn deterministic_guards() -> Vec<String> {
    vec![
        "fixed_week_order".to_string(),
        "no_wraparound_day_ranges".to_string(),
    ]
}
