//! Daily trigger times.

use std::fmt;

use chrono::Timelike;
use thiserror::Error;

/// Errors from parsing an "HH:MM" trigger time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    /// Not two ':'-separated parts of two digits each.
    #[error("invalid time format '{0}', expected HH:MM")]
    Format(String),
    /// Hour outside 0..=23.
    #[error("hour out of range in '{0}'")]
    Hour(String),
    /// Minute outside 0..=59.
    #[error("minute out of range in '{0}'")]
    Minute(String),
}

/// A wall-clock time of day at which a daily job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TriggerTime {
    hour: u32,
    minute: u32,
}

impl TriggerTime {
    /// Parse "HH:MM". Both parts must be exactly two digits.
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let format_err = || TimeParseError::Format(s.to_string());

        let mut parts = s.split(':');
        let (Some(hour), Some(minute), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format_err());
        };
        let hour = parse_two_digits(hour).ok_or_else(format_err)?;
        let minute = parse_two_digits(minute).ok_or_else(format_err)?;

        if hour > 23 {
            return Err(TimeParseError::Hour(s.to_string()));
        }
        if minute > 59 {
            return Err(TimeParseError::Minute(s.to_string()));
        }
        Ok(Self { hour, minute })
    }

    /// Hour of day.
    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Minute of hour.
    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Whether `now` is in `[self, self + window_minutes)` within the same hour.
    pub fn matches<T: Timelike>(&self, now: &T, window_minutes: u32) -> bool {
        now.hour() == self.hour
            && now.minute() >= self.minute
            && now.minute() < self.minute + window_minutes
    }
}

impl fmt::Display for TriggerTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

fn parse_two_digits(part: &str) -> Option<u32> {
    if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_valid() {
        let t = TriggerTime::parse("08:00").unwrap();
        assert_eq!((t.hour(), t.minute()), (8, 0));
        assert_eq!(TriggerTime::parse("23:59").unwrap().to_string(), "23:59");
        assert_eq!(TriggerTime::parse("00:00").unwrap().to_string(), "00:00");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["8:0", "8:00", "08:0", "0800", "08:00:00", "", "ab:cd", "+8:00", "08:"] {
            assert!(
                matches!(TriggerTime::parse(input), Err(TimeParseError::Format(_))),
                "{input} should be a format error"
            );
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(
            TriggerTime::parse("25:00"),
            Err(TimeParseError::Hour("25:00".to_string()))
        );
        assert_eq!(
            TriggerTime::parse("12:60"),
            Err(TimeParseError::Minute("12:60".to_string()))
        );
    }

    #[test]
    fn test_matches_window() {
        let t = TriggerTime::parse("08:00").unwrap();
        assert!(t.matches(&at(8, 0), 10));
        assert!(t.matches(&at(8, 7), 10));
        assert!(t.matches(&at(8, 9), 10));
        assert!(!t.matches(&at(8, 10), 10));
        assert!(!t.matches(&at(7, 59), 10));
        assert!(!t.matches(&at(20, 5), 10));
    }

    #[test]
    fn test_matches_does_not_wrap_hour() {
        let t = TriggerTime::parse("08:55").unwrap();
        assert!(t.matches(&at(8, 59), 10));
        assert!(!t.matches(&at(9, 0), 10));
    }

    #[test]
    fn test_error_display() {
        let err = TriggerTime::parse("x").unwrap_err();
        assert_eq!(err.to_string(), "invalid time format 'x', expected HH:MM");
    }
}
