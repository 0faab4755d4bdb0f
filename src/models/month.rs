//! Calendar month key.
//!
//! Every engine operation takes an explicit [`Month`]; there is no ambient
//! "current month" anywhere in the engine.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, EngineResult};

/// A calendar month, serialized as `YYYY-MM`.
///
/// # Example
///
/// ```
/// use settlement_engine::models::Month;
///
/// let month: Month = "2026-02".parse().unwrap();
/// assert_eq!(month.days().count(), 28);
/// assert_eq!(month.to_string(), "2026-02");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Creates a month, validating that `month` is in `1..=12`.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(EngineError::InvalidMonth {
                value: format!("{:04}-{:02}", year, month),
            });
        }
        Ok(Self { year, month })
    }

    /// Returns the month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month number, 1 through 12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The first calendar day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// The last calendar day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    /// The following month.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Returns true if `date` falls inside this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Iterates every calendar day of the month in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let last = self.last_day();
        self.first_day().iter_days().take_while(move |d| *d <= last)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidMonth {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Month::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let month: Month = "2026-01".parse().unwrap();
        assert_eq!(month.year(), 2026);
        assert_eq!(month.month(), 1);
        assert_eq!(month.to_string(), "2026-01");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for bad in ["2026-13", "2026-1", "26-01", "2026/01", "", "abcd-ef"] {
            assert!(
                matches!(bad.parse::<Month>(), Err(EngineError::InvalidMonth { .. })),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_days_in_leap_february() {
        let month: Month = "2028-02".parse().unwrap();
        assert_eq!(month.days().count(), 29);
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2028, 2, 29).unwrap());
    }

    #[test]
    fn test_december_rolls_over() {
        let month: Month = "2025-12".parse().unwrap();
        assert_eq!(month.next().to_string(), "2026-01");
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn test_contains() {
        let month: Month = "2026-03".parse().unwrap();
        assert!(month.contains(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()));
        assert!(!month.contains(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));
    }

    #[test]
    fn test_serde_as_string() {
        let month: Month = "2026-07".parse().unwrap();
        assert_eq!(serde_json::to_string(&month).unwrap(), "\"2026-07\"");
        let back: Month = serde_json::from_str("\"2026-07\"").unwrap();
        assert_eq!(back, month);
        assert!(serde_json::from_str::<Month>("\"2026-7\"").is_err());
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a: Month = "2025-12".parse().unwrap();
        let b: Month = "2026-01".parse().unwrap();
        assert!(a < b);
    }
}
