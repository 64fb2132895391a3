use chrono::Weekday;
use serde::{Serialize, Serializer};

/// Sentinel used for both `open` and `close` of a closed day.
pub const CLOSED: &str = "CLOSED";

/// Fixed week order used to expand day ranges. Ranges never wrap past `Sun`.
pub const WEEK_DAYS: [(&str, Weekday); 7] = [
    ("Mon", Weekday::Mon),
    ("Tue", Weekday::Tue),
    ("Wed", Weekday::Wed),
    ("Thu", Weekday::Thu),
    ("Fri", Weekday::Fri),
    ("Sat", Weekday::Sat),
    ("Sun", Weekday::Sun),
];

/// Normalized opening hours for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessHoursRecord {
    #[serde(serialize_with = "serialize_weekday")]
    pub day: Weekday,
    pub open: String,
    pub close: String,
}

/// Index of an exact three-letter abbreviation in [`WEEK_DAYS`].
pub fn week_day_index(abbreviation: &str) -> Option<usize> {
    WEEK_DAYS.iter().position(|(name, _)| *name == abbreviation)
}

fn serialize_weekday<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(WEEK_DAYS[day.num_days_from_monday() as usize].0)
}
