//! One blood pressure measurement and its on-disk line representation.
//!
//! A log line is `timestamp\tsystolic\tdiastolic\tpulse\tcomment\n`, with the
//! timestamp in the fixed-width `YYYY.MM.DD HH:MM` form so lines sort by time.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use thiserror::Error;

pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M";

/// Pulse token written by older versions of the bot when no pulse was given.
const LEGACY_NO_PULSE: &str = "None";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid timestamp '{0}'")]
    Timestamp(String),

    #[error("invalid {field} value '{value}'")]
    Number { field: &'static str, value: String },

    #[error("comment contains a tab or line break")]
    UnencodableComment,

    #[error("timestamp {0} is not a whole minute")]
    SubMinuteTimestamp(NaiveDateTime),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub systolic: u32,
    pub diastolic: u32,
    pub pulse: Option<u32>,
    pub comment: String,
}

impl Reading {
    /// Builds a reading; the timestamp is cut down to whole minutes, the
    /// precision the log keeps.
    pub fn new(
        timestamp: NaiveDateTime,
        systolic: u32,
        diastolic: u32,
        pulse: Option<u32>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: truncate_to_minute(timestamp),
            systolic,
            diastolic,
            pulse,
            comment: comment.into(),
        }
    }

    pub fn to_line(&self) -> Result<String, LineError> {
        if self.comment.contains(&['\t', '\n', '\r'][..]) {
            return Err(LineError::UnencodableComment);
        }
        if truncate_to_minute(self.timestamp) != self.timestamp {
            return Err(LineError::SubMinuteTimestamp(self.timestamp));
        }

        let pulse = self.pulse.map(|p| p.to_string()).unwrap_or_default();
        Ok(format!(
            "{}\t{}\t{}\t{}\t{}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.systolic,
            self.diastolic,
            pulse,
            self.comment
        ))
    }

    /// Parses one log line. The trailing line break, if any, is ignored.
    pub fn from_line(line: &str) -> Result<Self, LineError> {
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        let mut fields = line.splitn(5, '\t');

        let timestamp = fields.next().ok_or(LineError::MissingField("timestamp"))?;
        let systolic = fields.next().ok_or(LineError::MissingField("systolic"))?;
        let diastolic = fields.next().ok_or(LineError::MissingField("diastolic"))?;
        let pulse = fields.next().ok_or(LineError::MissingField("pulse"))?;
        let comment = fields.next().ok_or(LineError::MissingField("comment"))?;

        let timestamp = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .map_err(|_| LineError::Timestamp(timestamp.to_string()))?;

        let pulse = match pulse {
            "" | LEGACY_NO_PULSE => None,
            value => Some(parse_number(value, "pulse")?),
        };

        Ok(Self {
            timestamp,
            systolic: parse_number(systolic, "systolic")?,
            diastolic: parse_number(diastolic, "diastolic")?,
            pulse,
            comment: comment.to_string(),
        })
    }
}

fn parse_number(value: &str, field: &'static str) -> Result<u32, LineError> {
    value.parse().map_err(|_| LineError::Number {
        field,
        value: value.to_string(),
    })
}

fn truncate_to_minute(timestamp: NaiveDateTime) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(timestamp.hour(), timestamp.minute(), 0)
        .unwrap_or_else(|| timestamp.time());
    NaiveDateTime::new(timestamp.date(), time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn writes_fixed_width_tab_separated_line() {
        let reading = Reading::new(at(8, 5, 0), 120, 80, Some(70), "feeling ok");
        assert_eq!(
            reading.to_line().unwrap(),
            "2024.03.07 08:05\t120\t80\t70\tfeeling ok\n"
        );
    }

    #[test]
    fn missing_pulse_is_an_empty_field() {
        let reading = Reading::new(at(21, 30, 0), 135, 90, None, "");
        let line = reading.to_line().unwrap();
        assert_eq!(line, "2024.03.07 21:30\t135\t90\t\t\n");
        assert_eq!(Reading::from_line(&line).unwrap(), reading);
    }

    #[test]
    fn seconds_are_dropped_on_construction() {
        let reading = Reading::new(at(10, 15, 42), 118, 76, None, "");
        assert_eq!(reading.timestamp, at(10, 15, 0));
    }

    #[test]
    fn reads_legacy_none_pulse() {
        let reading = Reading::from_line("2023.11.02 07:45\t140\t95\tNone\tafter coffee").unwrap();
        assert_eq!(reading.pulse, None);
        assert_eq!(reading.comment, "after coffee");
    }

    #[test]
    fn comment_keeps_everything_after_fourth_tab() {
        let reading = Reading::from_line("2023.11.02 07:45\t140\t95\t66\t").unwrap();
        assert_eq!(reading.comment, "");
        assert_eq!(reading.pulse, Some(66));
    }

    #[test]
    fn rejects_short_and_garbled_lines() {
        assert_eq!(
            Reading::from_line("2023.11.02 07:45\t140\t95"),
            Err(LineError::MissingField("pulse"))
        );
        assert!(matches!(
            Reading::from_line("11/02/2023, 07:45\t140\t95\t\t"),
            Err(LineError::Timestamp(_))
        ));
        assert!(matches!(
            Reading::from_line("2023.11.02 07:45\tabc\t95\t\t"),
            Err(LineError::Number { field: "systolic", .. })
        ));
    }

    #[test]
    fn refuses_timestamps_finer_than_a_minute() {
        let reading = Reading {
            timestamp: at(8, 0, 42),
            systolic: 120,
            diastolic: 80,
            pulse: None,
            comment: String::new(),
        };
        assert_eq!(
            reading.to_line(),
            Err(LineError::SubMinuteTimestamp(at(8, 0, 42)))
        );
    }

    #[test]
    fn refuses_comments_that_would_break_the_line() {
        let reading = Reading::new(at(9, 0, 0), 120, 80, None, "two\tcolumns");
        assert_eq!(reading.to_line(), Err(LineError::UnencodableComment));
    }
}
