//! Calendar ranges and intraday session boundaries.
//!
//! All dates are day-granular `NaiveDate`s on a UTC basis. A
//! [`CalendarRange`] is inclusive on both ends; `from == to` is a valid
//! single-day range. Weekend handling is a property of the enumeration,
//! not of the range itself: [`CalendarRange::trading_days`] omits Saturday
//! and Sunday entirely when weekends are excluded, so excluded days are
//! never reported as missing — they are simply never expected.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive day-granularity date interval.
///
/// Invariant: `from <= to`. The store validates this at the request
/// boundary before any I/O; ranges constructed directly are expected to
/// hold it too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl CalendarRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Single-day range.
    pub fn single(date: NaiveDate) -> Self {
        Self { from: date, to: date }
    }

    /// Ascending enumeration of every calendar day in the range, both
    /// endpoints included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let to = self.to;
        self.from.iter_days().take_while(move |d| *d <= to)
    }

    /// Like [`days`](Self::days), but omits Saturday and Sunday when
    /// `include_weekends` is false.
    pub fn trading_days(&self, include_weekends: bool) -> impl Iterator<Item = NaiveDate> {
        self.days()
            .filter(move |d| include_weekends || !is_weekend(*d))
    }

    /// Number of calendar days in the range (at least 1).
    pub fn day_count(&self) -> usize {
        (self.to - self.from).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Smallest range covering both `self` and `other`.
    pub fn union(&self, other: &CalendarRange) -> CalendarRange {
        CalendarRange {
            from: self.from.min(other.from),
            to: self.to.max(other.to),
        }
    }

    /// The full-day UTC time window `[from 00:00:00, to 23:59:59]`.
    pub fn time_window(&self) -> TimeWindow {
        TimeWindow {
            start: TimeOfDay::MIDNIGHT.on(self.from),
            end: TimeOfDay::END_OF_DAY.on(self.to),
        }
    }
}

impl fmt::Display for CalendarRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

/// True for Saturday and Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Wall-clock boundary of an intraday session.
///
/// Component values are validated at construction, so converting onto a
/// date cannot fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
    second: u8,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { hour: 0, minute: 0, second: 0 };
    pub const END_OF_DAY: TimeOfDay = TimeOfDay { hour: 23, minute: 59, second: 59 };

    /// Returns `None` when any component is out of range.
    pub fn new(hour: u8, minute: u8, second: u8) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self { hour, minute, second })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// This time of day on `date`, as a UTC timestamp.
    pub fn on(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32)
            .expect("components validated at construction")
            .and_utc()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Inclusive UTC timestamp interval — what a tick fetch actually asks the
/// provider for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// The window for one trading day: `[date 00:00:00, date 23:59:59]`
    /// intersected with the session bounds.
    pub fn trading_day(date: NaiveDate, session_start: TimeOfDay, session_end: TimeOfDay) -> Self {
        TimeWindow {
            start: session_start.max(TimeOfDay::MIDNIGHT).on(date),
            end: session_end.min(TimeOfDay::END_OF_DAY).on(date),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
