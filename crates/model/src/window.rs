use std::fmt::{self, Debug, Display};

use chrono::{Datelike as _, NaiveDate, NaiveDateTime, NaiveTime, Timelike as _, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)`
/// overlap iff `a_start < b_end && b_start < a_end`.
/// Touching endpoints are not an overlap.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    #[error("Start time must be before end time")]
    Empty,
    #[error("Window is in the past")]
    InPast,
}

/// Truncates to minute resolution.
pub fn normalize(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<TimeRange, WindowError> {
        let (start, end) = (normalize(start), normalize(end));
        if start >= end {
            return Err(WindowError::Empty);
        }
        Ok(TimeRange { start, end })
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    pub fn duration_min(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl Debug for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt = "%H:%M";
        write!(f, "{}-{}", self.start.format(fmt), self.end.format(fmt))
    }
}

/// A concrete booking window on a calendar date.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Result<TimeWindow, WindowError> {
        let range = TimeRange::new(start, end)?;
        Ok(TimeWindow::with_range(date, range))
    }

    pub fn with_range(date: NaiveDate, range: TimeRange) -> TimeWindow {
        TimeWindow {
            date,
            start: range.start,
            end: range.end,
        }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start,
            end: self.end,
        }
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn start_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }

    pub fn end_at(&self) -> NaiveDateTime {
        self.date.and_time(self.end)
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.date == other.date && self.range().overlaps(&other.range())
    }

    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.date < today
    }
}

impl Debug for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[({}):{}]", self.date.format("%d.%m.%Y"), self.range())
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.range())
    }
}
