//! Calendar month used as the budget period
//!
//! A budget period is derived, never stored: the key `(category, YearMonth)`
//! aggregates every transaction dated in that month.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month, e.g. "2025-01"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a month; `month` is 1-based
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodParseError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodParseError::InvalidMonth(month));
        }
        // Keep first and last day representable
        if NaiveDate::from_ymd_opt(year, month, 1).is_none()
            || NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)).is_none()
        {
            return Err(PeriodParseError::OutOfRange(year));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Number of days in this month
    pub fn len_days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        self.day_clamped(1)
    }

    /// Last day of the month
    pub fn last_day(&self) -> NaiveDate {
        self.day_clamped(self.len_days())
    }

    /// The given day of this month, clamped to the month's last day
    ///
    /// Anchor 31 in February yields the 28th (or 29th in a leap year).
    pub fn day_clamped(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.len_days());
        // `new` guarantees every day of the month is representable
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or(NaiveDate::MIN)
    }

    /// Shift by a number of months; `None` outside chrono's date range
    pub fn add_months(&self, months: i64) -> Option<Self> {
        let index = self.year as i64 * 12 + (self.month as i64 - 1) + months;
        let year = i32::try_from(index.div_euclid(12)).ok()?;
        let month = (index.rem_euclid(12) + 1) as u32;
        Self::new(year, month).ok()
    }

    pub fn next(&self) -> Option<Self> {
        self.add_months(1)
    }

    pub fn prev(&self) -> Option<Self> {
        self.add_months(-1)
    }

    /// Check if a date falls within this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Current month in local time
    pub fn current() -> Self {
        Self::of(chrono::Local::now().date_naive())
    }

    /// Parse "YYYY-MM"
    pub fn parse(s: &str) -> Result<Self, PeriodParseError> {
        let s = s.trim();
        let (year, month) = s
            .rsplit_once('-')
            .ok_or_else(|| PeriodParseError::InvalidFormat(s.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;
        Self::new(year, month)
    }
}

/// Number of days in a month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = PeriodParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

/// Error type for period parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    InvalidFormat(String),
    InvalidMonth(u32),
    OutOfRange(i32),
}

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodParseError::InvalidFormat(s) => write!(f, "Invalid month format: {}", s),
            PeriodParseError::InvalidMonth(m) => write!(f, "Invalid month: {}", m),
            PeriodParseError::OutOfRange(y) => write!(f, "Year out of range: {}", y),
        }
    }
}

impl std::error::Error for PeriodParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bounds() {
        let jan = YearMonth::new(2025, 1).unwrap();
        assert_eq!(jan.first_day(), date(2025, 1, 1));
        assert_eq!(jan.last_day(), date(2025, 1, 31));
    }

    #[test]
    fn test_day_clamping() {
        assert_eq!(YearMonth::new(2025, 2).unwrap().day_clamped(31), date(2025, 2, 28));
        assert_eq!(YearMonth::new(2024, 2).unwrap().day_clamped(31), date(2024, 2, 29));
        assert_eq!(YearMonth::new(2025, 4).unwrap().day_clamped(31), date(2025, 4, 30));
        assert_eq!(YearMonth::new(2025, 4).unwrap().day_clamped(15), date(2025, 4, 15));
    }

    #[test]
    fn test_month_navigation() {
        let dec = YearMonth::new(2024, 12).unwrap();
        assert_eq!(dec.next().unwrap(), YearMonth::new(2025, 1).unwrap());
        assert_eq!(dec.add_months(-12).unwrap(), YearMonth::new(2023, 12).unwrap());
        assert_eq!(dec.add_months(14).unwrap(), YearMonth::new(2026, 2).unwrap());
        let jan = YearMonth::new(2025, 1).unwrap();
        assert_eq!(jan.prev().unwrap(), dec);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2025, 9), 30);
    }

    #[test]
    fn test_contains() {
        let jan = YearMonth::new(2025, 1).unwrap();
        assert!(jan.contains(date(2025, 1, 15)));
        assert!(!jan.contains(date(2025, 2, 1)));
        assert!(!jan.contains(date(2024, 1, 15)));
    }

    #[test]
    fn test_parse_and_display() {
        let ym = YearMonth::parse("2025-03").unwrap();
        assert_eq!(ym, YearMonth::new(2025, 3).unwrap());
        assert_eq!(ym.to_string(), "2025-03");
        assert_eq!(YearMonth::parse("2025-13"), Err(PeriodParseError::InvalidMonth(13)));
        assert!(YearMonth::parse("March").is_err());
    }

    #[test]
    fn test_serialization() {
        let ym = YearMonth::new(2025, 1).unwrap();
        let json = serde_json::to_string(&ym).unwrap();
        assert_eq!(json, "\"2025-01\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym);
    }
}
