use chrono::{Duration, Local, NaiveDate};
use model::window::{TimeWindow, WindowError};

use crate::SchedulerConfig;

pub mod availability;
pub mod booking;
pub mod classes;
pub mod rooms;
pub mod schedule;

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Re-validates and normalizes a caller supplied window and applies the past-date policy.
pub(crate) fn admit_window(
    window: &TimeWindow,
    config: &SchedulerConfig,
) -> Result<TimeWindow, WindowError> {
    let window = TimeWindow::new(window.date, window.start, window.end)?;
    if !config.allow_past_dates && window.is_past(today()) {
        return Err(WindowError::InPast);
    }
    Ok(window)
}

/// Inclusive range of `days` dates starting at `from`, clamped to the last representable date.
pub(crate) fn date_span(from: NaiveDate, days: u32) -> Option<(NaiveDate, NaiveDate)> {
    if days == 0 {
        return None;
    }
    let to = Duration::try_days(days as i64 - 1)
        .and_then(|span| from.checked_add_signed(span))
        .unwrap_or(NaiveDate::MAX);
    Some((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_span() {
        let from = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        assert_eq!(date_span(from, 0), None);
        assert_eq!(date_span(from, 1), Some((from, from)));
        assert_eq!(
            date_span(from, 3),
            Some((from, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()))
        );
        assert_eq!(date_span(from, u32::MAX), Some((from, NaiveDate::MAX)));
    }
}
