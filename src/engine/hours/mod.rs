//! Expansion of compressed weekly business hours.
//!
//! `"Mon-Thu 10:30am-8:30pm, Fri 10:30am-9pm"` becomes one record per day:
//! `[{"day":"Mon","open":"1030","close":"2030"}, ..., {"day":"Fri","open":"1030","close":"2100"}]`.

use chrono::Weekday;
use thiserror::Error;

use crate::domain::hours::{BusinessHoursRecord, CLOSED, WEEK_DAYS, week_day_index};

#[derive(Debug, Error)]
pub enum HoursError {
    #[error("segment `{segment}` has no time range")]
    MissingTimeRange { segment: String },

    #[error("time range `{range}` has no closing time")]
    MissingCloseTime { range: String },

    #[error("unknown day `{day}`; expected one of Mon, Tue, Wed, Thu, Fri, Sat, Sun")]
    UnknownDay { day: String },

    #[error("invalid hour in time `{time}`")]
    InvalidHour { time: String },

    #[error("failed to serialize business hours: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Expands `text` and serializes the records as a compact JSON array.
pub fn expand_weekly_hours(text: &str) -> Result<String, HoursError> {
    let records = parse_weekly_hours(text)?;
    Ok(serde_json::to_string(&records)?)
}

/// Expands every `,`-separated `<days> <open>-<close>` segment, in input order.
///
/// Blank segments are skipped. A lone `closed` time marks the whole day range as closed.
pub fn parse_weekly_hours(text: &str) -> Result<Vec<BusinessHoursRecord>, HoursError> {
    let mut records = Vec::new();
    for segment in text.split(',').map(str::trim) {
        if segment.is_empty() {
            continue;
        }
        let mut fields = segment.split_whitespace();
        let days = fields.next().unwrap_or_default();
        let Some(range) = fields.next() else {
            return Err(HoursError::MissingTimeRange {
                segment: segment.to_string(),
            });
        };

        let (open, close) = match range.split_once('-') {
            Some((open, close)) => (convert_time_12_to_24(open)?, convert_time_12_to_24(close)?),
            None if is_closed(range) => (CLOSED.to_string(), CLOSED.to_string()),
            None => {
                return Err(HoursError::MissingCloseTime {
                    range: range.to_string(),
                });
            }
        };

        for day in required_days(days)? {
            records.push(BusinessHoursRecord {
                day,
                open: open.clone(),
                close: close.clone(),
            });
        }
    }
    Ok(records)
}

/// Resolves `Mon-Thu` (or a single `Fri`) to the inclusive run of week days.
///
/// Ranges that would wrap past Sunday (`Fri-Mon`) resolve to no days.
pub fn required_days(range: &str) -> Result<Vec<Weekday>, HoursError> {
    let (start, end) = range.split_once('-').unwrap_or((range, range));
    let start_index = resolve_day(start)?;
    let end_index = resolve_day(end)?;
    if start_index > end_index {
        return Ok(Vec::new());
    }
    Ok(WEEK_DAYS[start_index..=end_index]
        .iter()
        .map(|(_, day)| *day)
        .collect())
}

fn resolve_day(day: &str) -> Result<usize, HoursError> {
    week_day_index(day).ok_or_else(|| HoursError::UnknownDay {
        day: day.to_string(),
    })
}

/// Converts a 12-hour clock time (`4pm`, `10:30am`) to a 4-digit 24-hour string.
///
/// `closed` and `cl` (any case) map to `CLOSED`. The last two characters are
/// the meridiem; `12` maps to hour `00` before the `pm` offset is added, so
/// `12am` is `0000` and `12pm` is `1200`.
pub fn convert_time_12_to_24(time: &str) -> Result<String, HoursError> {
    if is_closed(time) {
        return Ok(CLOSED.to_string());
    }

    let split_at = time.len().saturating_sub(2);
    if !time.is_char_boundary(split_at) {
        return Err(invalid_hour(time));
    }
    let (clock, meridiem) = time.split_at(split_at);

    let mut fields = clock.split(':');
    let hours = fields.next().unwrap_or_default();
    let minutes = fields.next().unwrap_or("00");
    if hours.is_empty() || !hours.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(invalid_hour(time));
    }

    let mut hours = match hours {
        "12" => "00".to_string(),
        single if single.len() == 1 => format!("0{single}"),
        other => other.to_string(),
    };
    if meridiem.eq_ignore_ascii_case("pm") {
        let value: u32 = hours.parse().map_err(|_| invalid_hour(time))?;
        hours = value
            .checked_add(12)
            .ok_or_else(|| invalid_hour(time))?
            .to_string();
    }

    Ok(format!("{hours}{minutes}"))
}

fn is_closed(time: &str) -> bool {
    time.eq_ignore_ascii_case("closed") || time.eq_ignore_ascii_case("cl")
}

fn invalid_hour(time: &str) -> HoursError {
    HoursError::InvalidHour {
        time: time.to_string(),
    }
}
