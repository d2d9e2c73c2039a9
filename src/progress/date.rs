use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::error::ProgressError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A day-granularity date whose canonical text form is zero-padded `YYYY-MM-DD`.
///
/// Ordering follows the calendar, which is also the lexicographic order of the
/// canonical strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).and_then(Self::canonical)
    }

    /// Years outside 0000..=9999 have no four-digit text form.
    fn canonical(date: NaiveDate) -> Option<Self> {
        (0..=9999).contains(&date.year()).then_some(Self(date))
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// Calendar-day difference `self - other`.
    pub fn days_since(&self, other: CalendarDate) -> i64 {
        (self.0 - other.0).num_days()
    }

    /// `None` when the result leaves the representable range.
    pub fn add_days(&self, days: i64) -> Option<Self> {
        let delta = Duration::try_days(days)?;
        self.0.checked_add_signed(delta).and_then(Self::canonical)
    }

    pub fn succ(&self) -> Option<Self> {
        self.add_days(1)
    }

    pub fn pred(&self) -> Option<Self> {
        self.add_days(-1)
    }
}

impl FromStr for CalendarDate {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProgressError::InvalidDate {
            input: s.to_string(),
        };

        // chrono accepts unpadded fields; the canonical form does not.
        let bytes = s.as_bytes();
        let shaped = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !shaped {
            return Err(invalid());
        }

        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_form() {
        let d: CalendarDate = "2024-02-29".parse().unwrap();
        assert_eq!(d, CalendarDate::from_ymd(2024, 2, 29).unwrap());
        assert_eq!(d.to_string(), "2024-02-29");
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in [
            "",
            "2024-2-01",
            "2024-02-1",
            "2023-02-29",
            "2024/02/01",
            "2024-02-01T10:00:00Z",
            " 2024-02-01",
            "yesterday",
        ] {
            let err = bad.parse::<CalendarDate>().unwrap_err();
            assert_eq!(
                err,
                ProgressError::InvalidDate {
                    input: bad.to_string()
                }
            );
        }
    }

    #[test]
    fn day_arithmetic_crosses_month_and_year() {
        let d: CalendarDate = "2024-01-01".parse().unwrap();
        assert_eq!(d.pred().unwrap().to_string(), "2023-12-31");
        assert_eq!(d.add_days(31).unwrap().to_string(), "2024-02-01");
        assert_eq!(d.add_days(31).unwrap().days_since(d), 31);
        assert_eq!(d.pred().unwrap().days_since(d), -1);
    }

    #[test]
    fn huge_offsets_return_none() {
        let d: CalendarDate = "2024-05-01".parse().unwrap();
        assert!(d.add_days(5_000_000_000).is_none());
        assert!(d.add_days(100_000_000_000).is_none());
        assert!(d.add_days(i64::MAX).is_none());
        assert!(d.add_days(-1_000_000).is_none());
        // Fits in chrono but would print as a five-digit year.
        assert!(d.add_days(3_000_000).is_none());
        assert_eq!(
            "9999-12-31".parse::<CalendarDate>().unwrap().succ(),
            None
        );
    }

    #[test]
    fn ordering_matches_string_ordering() {
        let mut dates: Vec<CalendarDate> = ["2024-10-02", "2023-12-31", "2024-09-30"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        dates.sort();
        let strings: Vec<String> = dates.iter().map(|d| d.to_string()).collect();
        let mut expected = strings.clone();
        expected.sort();
        assert_eq!(strings, expected);
    }

    #[test]
    fn serde_uses_canonical_string() {
        let d: CalendarDate = "2025-03-07".parse().unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"2025-03-07\"");
        let back: CalendarDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
        assert!(serde_json::from_str::<CalendarDate>("\"2025-3-7\"").is_err());
    }
}
