//! Local-time date handling: the fixed-width `YYYY/MM/DD HH:MM:SS` format,
//! whole-day windows, and timestamp rendering.

use crate::{Error, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone};
use serde::Serialize;

/// Inclusive bounds, in epoch seconds, applied while parsing fresh logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimeWindow {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl TimeWindow {
    pub fn new(start: Option<f64>, end: Option<f64>) -> Self {
        Self { start, end }
    }

    /// 00:00:00 through 23:59:59 local time on `date`.
    pub fn day(date: NaiveDate) -> Result<Self> {
        let start = date
            .and_hms_opt(0, 0, 0)
            .and_then(local_timestamp)
            .ok_or_else(|| Error::BadDate(date.to_string()))?;
        let end = date
            .and_hms_opt(23, 59, 59)
            .and_then(local_timestamp)
            .ok_or_else(|| Error::BadDate(date.to_string()))?;
        Ok(Self::new(Some(start), Some(end)))
    }

    pub fn today() -> Result<Self> {
        Self::day(Local::now().date_naive())
    }

    pub fn days_ago(days: u32) -> Result<Self> {
        let then = Local::now() - TimeDelta::days(i64::from(days));
        Self::day(then.date_naive())
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Parse `YYYY/MM/DD HH:MM:SS` (local time) by fixed column positions.
///
/// The separators are not checked, only the digit groups.
pub fn parse_date(value: &str) -> Result<f64> {
    let val = value.trim();
    let bad = || Error::BadDate(value.to_string());

    let field = |range: std::ops::Range<usize>| -> Result<u32> {
        val.get(range)
            .and_then(|s| s.trim().parse::<u32>().ok())
            .ok_or_else(bad)
    };

    let year = field(0..4)?;
    let month = field(5..7)?;
    let day = field(8..10)?;
    let hour = field(11..13)?;
    let minute = field(14..16)?;
    let second = field(17..19)?;

    NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .and_then(local_timestamp)
        .ok_or_else(bad)
}

fn local_timestamp(naive: NaiveDateTime) -> Option<f64> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp() as f64)
}

/// Render epoch seconds as local `YYYY-MM-DDTHH:MM:SS`.
pub fn format_timestamp(t: f64) -> String {
    format_local(t, "%Y-%m-%dT%H:%M:%S")
}

/// Render epoch seconds as local `HH:MM:SS`.
pub fn format_time_of_day(t: f64) -> String {
    format_local(t, "%H:%M:%S")
}

fn format_local(t: f64, fmt: &str) -> String {
    match Local.timestamp_opt(t.floor() as i64, 0).single() {
        Some(dt) => dt.format(fmt).to_string(),
        None => "NA".to_string(),
    }
}
