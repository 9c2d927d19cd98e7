//! Timestamp decomposition
//!
//! Splits a timestamp string into calendar parts (hour of day, day of week,
//! ...) usable as model features.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use rankprep_core::{ColumnData, Dataset, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPart {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    /// Monday is 0
    Weekday,
}

impl TimestampPart {
    pub const ALL: [TimestampPart; 7] = [
        TimestampPart::Year,
        TimestampPart::Month,
        TimestampPart::Day,
        TimestampPart::Hour,
        TimestampPart::Minute,
        TimestampPart::Second,
        TimestampPart::Weekday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampPart::Year => "year",
            TimestampPart::Month => "month",
            TimestampPart::Day => "day",
            TimestampPart::Hour => "hour",
            TimestampPart::Minute => "minute",
            TimestampPart::Second => "second",
            TimestampPart::Weekday => "weekday",
        }
    }

    pub fn extract(&self, dt: &NaiveDateTime) -> i64 {
        match self {
            TimestampPart::Year => dt.year() as i64,
            TimestampPart::Month => dt.month() as i64,
            TimestampPart::Day => dt.day() as i64,
            TimestampPart::Hour => dt.hour() as i64,
            TimestampPart::Minute => dt.minute() as i64,
            TimestampPart::Second => dt.second() as i64,
            TimestampPart::Weekday => dt.weekday().num_days_from_monday() as i64,
        }
    }
}

impl fmt::Display for TimestampPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimestampPart {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TimestampPart::ALL
            .into_iter()
            .find(|part| part.as_str() == s)
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "unknown timestamp part '{}', expected one of year, month, day, hour, minute, second, weekday",
                    s
                ))
            })
    }
}

/// Parse a timestamp; date-only formats are read as midnight
pub fn parse_timestamp(timestamp: &str, format: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(timestamp, format)
        .or_else(|e| {
            NaiveDate::parse_from_str(timestamp, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .ok_or(e)
        })
        .map_err(|e| {
            Error::InvalidInput(format!(
                "cannot parse timestamp '{}' with format '{}': {}",
                timestamp, format, e
            ))
        })
}

/// One part of a timestamp string
pub fn timestamp_part(timestamp: &str, part: TimestampPart, format: &str) -> Result<i64> {
    Ok(part.extract(&parse_timestamp(timestamp, format)?))
}

/// Add `output_col` holding `part` of every timestamp in `column`
///
/// Missing timestamps give missing parts; unparsable ones fail the call.
pub fn add_timestamp_part_column(
    dataset: &Dataset,
    column: &str,
    part: TimestampPart,
    format: &str,
    output_col: &str,
) -> Result<Dataset> {
    let values = dataset
        .categorical(column)?
        .iter()
        .map(|ts| {
            ts.as_deref()
                .map(|ts| timestamp_part(ts, part, format).map(|v| v as f64))
                .transpose()
        })
        .collect::<Result<Vec<Option<f64>>>>()?;
    dataset
        .clone()
        .with_column(output_col, ColumnData::Numeric(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timestamp_parts() {
        let cases = [
            ("2024-07-01 01:00:00", TimestampPart::Hour, 1),
            ("1999-12-06 12:56:45", TimestampPart::Second, 45),
            ("2024-07-26 12:56:45", TimestampPart::Weekday, 4),
            ("2024-07-01 01:00:00", TimestampPart::Weekday, 0),
            ("2024-07-26 12:56:45", TimestampPart::Month, 7),
        ];
        for (ts, part, expected) in cases {
            assert_eq!(
                timestamp_part(ts, part, DEFAULT_TIMESTAMP_FORMAT).unwrap(),
                expected,
                "{} of {}",
                part,
                ts
            );
        }
    }

    #[test]
    fn test_custom_and_date_only_formats() {
        assert_eq!(
            timestamp_part("26/07/2024 08:15", TimestampPart::Minute, "%d/%m/%Y %H:%M").unwrap(),
            15
        );
        assert_eq!(
            timestamp_part("2024-07-26", TimestampPart::Day, "%Y-%m-%d").unwrap(),
            26
        );
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            timestamp_part("yesterday", TimestampPart::Hour, DEFAULT_TIMESTAMP_FORMAT),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            "fortnight".parse::<TimestampPart>(),
            Err(Error::Configuration(_))
        ));
        assert_eq!("weekday".parse::<TimestampPart>().unwrap(), TimestampPart::Weekday);
    }

    #[test]
    fn test_add_timestamp_part_column() {
        let data = Dataset::from_records(&[
            json!({"ts": "2024-07-01 01:00:00"}),
            json!({"ts": null}),
        ])
        .unwrap();
        let result = add_timestamp_part_column(
            &data,
            "ts",
            TimestampPart::Hour,
            DEFAULT_TIMESTAMP_FORMAT,
            "ts_hour",
        )
        .unwrap();
        assert_eq!(result.numeric("ts_hour").unwrap(), &[Some(1.0), None]);
    }
}
