//! Query window expansion
//!
//! Turns a query (start date-time + duration) into per-calendar-day slices of
//! wall-clock time. Matching is done by exact interval overlap against these
//! slices, so a 15-minute restriction inside a six-hour stay is never missed.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use parkwise_engine::QueryWindow;
//!
//! // Saturday 22:00 for three hours spills into Sunday
//! let start = NaiveDate::from_ymd_opt(2025, 1, 4)
//!     .unwrap()
//!     .and_hms_opt(22, 0, 0)
//!     .unwrap();
//! let slices = QueryWindow::new(start, 180).day_slices();
//!
//! assert_eq!(slices.len(), 2);
//! assert_eq!(slices[0].day_of_week, 6);
//! assert_eq!(slices[1].day_of_week, 0);
//! ```

use crate::config::{MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};
use crate::error::{EngineError, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Timelike};

/// Seconds in one calendar day.
pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// The part of one calendar day covered by a query window.
///
/// The interval is half-open: `[start_secs, end_secs)` in seconds since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySlice {
    pub date: NaiveDate,
    /// 0 = Sunday ... 6 = Saturday
    pub day_of_week: u8,
    pub start_secs: u32,
    pub end_secs: u32,
}

impl DaySlice {
    /// Check whether `[start_secs, end_secs)` intersects this slice.
    pub fn overlaps(&self, start_secs: u32, end_secs: u32) -> bool {
        start_secs < self.end_secs && self.start_secs < end_secs
    }
}

/// A query window `[start, start + duration)` in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    start: NaiveDateTime,
    duration_minutes: u32,
}

impl QueryWindow {
    /// Create a window. Durations outside the supported range are clamped.
    pub fn new(start: NaiveDateTime, duration_minutes: u32) -> Self {
        let clamped = duration_minutes.clamp(MIN_DURATION_MINUTES, MAX_DURATION_MINUTES);
        if clamped != duration_minutes {
            tracing::warn!(
                requested = duration_minutes,
                clamped,
                "Query duration outside supported range"
            );
        }
        Self {
            start,
            duration_minutes: clamped,
        }
    }

    /// Create a window from a zoned date-time, using its local wall-clock.
    ///
    /// Rules are posted in local time, so the offset itself is irrelevant.
    pub fn from_datetime<Tz: TimeZone>(start: &DateTime<Tz>, duration_minutes: u32) -> Self {
        Self::new(start.naive_local(), duration_minutes)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Exclusive end of the window.
    pub fn end(&self) -> NaiveDateTime {
        self.start
            .checked_add_signed(TimeDelta::minutes(i64::from(self.duration_minutes)))
            .unwrap_or(NaiveDateTime::MAX)
    }

    /// Split the window into one slice per calendar day it touches.
    ///
    /// A window ending exactly at midnight does not touch the following day.
    pub fn day_slices(&self) -> Vec<DaySlice> {
        let end = self.end();
        let first_day = self.start.date();
        let last_day = end.date();

        let mut slices = Vec::with_capacity(2);
        let mut date = first_day;
        while date <= last_day {
            let start_secs = if date == first_day {
                self.start.time().num_seconds_from_midnight()
            } else {
                0
            };
            let end_secs = if date == last_day {
                end.time().num_seconds_from_midnight()
            } else {
                SECONDS_PER_DAY
            };

            if end_secs > start_secs {
                slices.push(DaySlice {
                    date,
                    day_of_week: day_of_week(date),
                    start_secs,
                    end_secs,
                });
            }

            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
        slices
    }
}

/// Convert a date into the 0 = Sunday day-of-week convention used by rules.
pub fn day_of_week(date: NaiveDate) -> u8 {
    // num_days_from_sunday is always 0..=6
    date.weekday().num_days_from_sunday() as u8
}

/// Accepted layouts for a local check time.
const CHECK_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a local ISO-8601 check time without offset (`YYYY-MM-DDTHH:MM[:SS]`).
pub fn parse_check_time(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    CHECK_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| EngineError::InvalidDateTime(raw.to_string()))
}

/// Expand `(check_time, duration_minutes)` into per-day slices.
pub fn expand(check_time: NaiveDateTime, duration_minutes: u32) -> Vec<DaySlice> {
    QueryWindow::new(check_time, duration_minutes).day_slices()
}
