//! Calendar arithmetic: dates in options, elapsed weeks, progress presets
//!
//! Nothing here reads the clock; callers pass `now` / `today` in.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde_json::json;

use crate::options::RawOptions;

const WEEK_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Parse a date from text: RFC 3339 (signed years past 9999 included), a
/// naive `YYYY-MM-DD[T| ]HH:MM[:SS[.f]]` (taken as UTC), a bare `YYYY-MM-DD`
/// or a bare four-digit year (midnight UTC, January 1st).
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = s.parse::<DateTime<Utc>>() {
        return Some(dt);
    }
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Whole weeks from `dob` to `now`, rounded toward negative infinity.
pub fn elapsed_weeks(dob: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - dob).num_milliseconds().div_euclid(WEEK_MS)
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0) && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let (y, m) = (date.year(), date.month());
    let next = if m == 12 {
        NaiveDate::from_ymd_opt(y + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(y, m + 1, 1)
    };
    match (next, NaiveDate::from_ymd_opt(y, m, 1)) {
        (Some(next), Some(first)) => (next - first).num_days() as u32,
        _ => 31,
    }
}

/// Which period a progress grid tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// Every day of the year, 15 per row.
    Days,
    /// 52 weeks of the year.
    Weeks,
    /// 12 months of the year.
    Months,
    /// Days of the current week, Monday first.
    Week,
    /// Days of the current month.
    Month,
    /// Every day of the year, 53 per row.
    Year,
}

impl ProgressStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "days" => Some(Self::Days),
            "weeks" => Some(Self::Weeks),
            "months" => Some(Self::Months),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// The HTTP `style` parameter: missing means days, and anything that is
    /// not `days` or `weeks` means months.
    pub fn from_query(s: Option<&str>) -> Self {
        match s.unwrap_or("days") {
            "days" => Self::Days,
            "weeks" => Self::Weeks,
            _ => Self::Months,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    pub fn default_columns(&self) -> u32 {
        match self {
            Self::Days => 15,
            Self::Weeks => 52,
            Self::Months => 4,
            Self::Week | Self::Month => 7,
            Self::Year => 53,
        }
    }

    /// Units, current index, columns and caption for the period containing
    /// `today`.
    pub fn preset(&self, today: NaiveDate) -> ProgressPreset {
        let year = today.year();
        let day_of_year = today.ordinal0() as i64;
        let short_date = today.format("%-m/%-d/%Y");
        let (units, current_index, caption) = match self {
            Self::Days | Self::Year => (
                days_in_year(year),
                day_of_year,
                format!("Progress of Year — {}", year),
            ),
            Self::Weeks => (52, day_of_year / 7, "Progress of Year - 52 Weeks".to_string()),
            Self::Months => (
                12,
                today.month0() as i64,
                "Year Progress - 12 Months".to_string(),
            ),
            Self::Week => (
                7,
                today.weekday().num_days_from_monday() as i64,
                format!("Progress of Week — {}", short_date),
            ),
            Self::Month => (
                days_in_month(today),
                today.day0() as i64,
                format!("Progress of Month — {}", short_date),
            ),
        };
        ProgressPreset {
            units,
            current_index,
            columns: self.default_columns(),
            caption,
        }
    }
}

/// A custom-mode grid derived from the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressPreset {
    pub units: u32,
    pub current_index: i64,
    pub columns: u32,
    pub caption: String,
}

impl ProgressPreset {
    /// Custom-mode raw options carrying this preset.
    pub fn to_raw(&self) -> RawOptions {
        RawOptions {
            mode: Some(json!("custom")),
            units: Some(json!(self.units)),
            current_index: Some(json!(self.current_index)),
            columns: Some(json!(self.columns)),
            caption: Some(json!(self.caption)),
            ..Default::default()
        }
    }
}
