//! `date`, `datetime` and `time`.
//!
//! Parsing goes ISO fast path, then the configured formats in order, then a
//! short list of generic layouts. Nothing here returns an error: input that
//! no layout accepts coerces to null.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};

use super::FieldType;
use crate::value::{Value, DATE_FORMAT, TIME_FORMAT};

const GENERIC_DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y%m%d", "%d-%m-%Y", "%b %d %Y", "%d %b %Y"];

const GENERIC_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const GENERIC_TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M%p", "%I:%M:%S%p"];

fn utc_midnight(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    date.and_hms_opt(0, 0, 0).map(as_utc)
}

fn as_utc(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    Utc.fix().from_utc_datetime(&naive)
}

/// Tries `text` as an offset-carrying datetime, then as a naive one (UTC).
fn parse_with_format(text: &str, format: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(text, format)
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(text, format).ok().map(as_utc))
}

fn parse_datetime(text: &str, formats: &[String]) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    formats
        .iter()
        .find_map(|f| parse_with_format(text, f))
        .or_else(|| DateTime::parse_from_rfc2822(text).ok())
        .or_else(|| {
            GENERIC_DATETIME_FORMATS
                .iter()
                .find_map(|f| parse_with_format(text, f))
        })
        .or_else(|| NaiveDate::parse_from_str(text, DATE_FORMAT).ok().and_then(utc_midnight))
}

fn parse_date(text: &str, formats: &[String]) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        return Some(date);
    }
    formats
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        .or_else(|| {
            GENERIC_DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        })
        .or_else(|| parse_datetime(text, &[]).map(|dt| dt.date_naive()))
}

fn parse_time(text: &str, formats: &[String]) -> Option<NaiveTime> {
    if let Ok(time) = NaiveTime::parse_from_str(text, TIME_FORMAT) {
        return Some(time);
    }
    formats
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(text, f).ok())
        .or_else(|| {
            GENERIC_TIME_FORMATS
                .iter()
                .find_map(|f| NaiveTime::parse_from_str(text, f).ok())
        })
        .or_else(|| parse_datetime(text, &[]).map(|dt| dt.time()))
}

#[derive(Debug, Clone, Default)]
pub struct DateType {
    formats: Vec<String>,
}

impl DateType {
    pub fn new(formats: Vec<String>) -> Self {
        Self { formats }
    }
}

impl FieldType for DateType {
    fn tag(&self) -> &str {
        "date"
    }

    fn is_native(&self, value: &Value) -> bool {
        matches!(value, Value::Date(_))
    }

    fn can_coerce(&self, value: &Value) -> bool {
        matches!(value, Value::String(_) | Value::DateTime(_))
    }

    fn coerce_value(&self, value: &Value) -> Value {
        match value {
            Value::DateTime(dt) => Value::Date(dt.date_naive()),
            Value::String(s) => parse_date(s.trim(), &self.formats).into(),
            _ => Value::Null,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DateTimeType {
    formats: Vec<String>,
}

impl DateTimeType {
    pub fn new(formats: Vec<String>) -> Self {
        Self { formats }
    }
}

impl FieldType for DateTimeType {
    fn tag(&self) -> &str {
        "datetime"
    }

    fn is_native(&self, value: &Value) -> bool {
        matches!(value, Value::DateTime(_))
    }

    fn can_coerce(&self, value: &Value) -> bool {
        matches!(value, Value::String(_) | Value::Date(_))
    }

    fn coerce_value(&self, value: &Value) -> Value {
        match value {
            Value::Date(date) => utc_midnight(*date).into(),
            Value::String(s) => parse_datetime(s.trim(), &self.formats).into(),
            _ => Value::Null,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeType {
    formats: Vec<String>,
}

impl TimeType {
    pub fn new(formats: Vec<String>) -> Self {
        Self { formats }
    }
}

impl FieldType for TimeType {
    fn tag(&self) -> &str {
        "time"
    }

    fn is_native(&self, value: &Value) -> bool {
        matches!(value, Value::Time(_))
    }

    fn can_coerce(&self, value: &Value) -> bool {
        matches!(value, Value::String(_) | Value::DateTime(_))
    }

    fn coerce_value(&self, value: &Value) -> Value {
        match value {
            Value::DateTime(dt) => Value::Time(dt.time()),
            Value::String(s) => parse_time(s.trim(), &self.formats).into(),
            _ => Value::Null,
        }
    }
}
