//! Time window resolution — named and numeric periods to concrete ranges.
//!
//! A `PeriodSpec` is either a named day (`yesterday`, `today`, `tomorrow`)
//! or a calendar year. Resolution is done against a reference "today"
//! timestamp whose timezone becomes the timezone of the resulting window.
//! All windows are half-open: `[start, end)`.
//!
//! Day arithmetic is calendar-based, not fixed-duration: a named-day window
//! that crosses a DST transition is 23 or 25 absolute hours long, and the
//! hourly expansion downstream reflects that.

use chrono::{DateTime, Days, LocalResult, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named or numeric period, resolved against a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSpec {
    Yesterday,
    Today,
    Tomorrow,
    Year(i32),
}

impl fmt::Display for PeriodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodSpec::Yesterday => write!(f, "yesterday"),
            PeriodSpec::Today => write!(f, "today"),
            PeriodSpec::Tomorrow => write!(f, "tomorrow"),
            PeriodSpec::Year(y) => write!(f, "{y}"),
        }
    }
}

impl FromStr for PeriodSpec {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yesterday" => Ok(PeriodSpec::Yesterday),
            "today" => Ok(PeriodSpec::Today),
            "tomorrow" => Ok(PeriodSpec::Tomorrow),
            other => other
                .parse::<i32>()
                .map(PeriodSpec::Year)
                .map_err(|_| WindowError::InvalidPeriod(s.to_string())),
        }
    }
}

/// A half-open timezone-aware timestamp range. Invariant: `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl TimeWindow {
    /// Number of whole hourly slots in `[start, end)`.
    ///
    /// Absolute-time arithmetic, so a spring-forward day yields 23 and a
    /// fall-back day 25.
    pub fn hour_slots(&self) -> usize {
        (self.end - self.start).num_hours().max(0) as usize
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Errors from period parsing and window resolution.
#[derive(Debug, Error)]
pub enum WindowError {
    #[error("invalid period '{0}' (expected yesterday, today, tomorrow, or a calendar year)")]
    InvalidPeriod(String),

    #[error("local midnight of {0} does not exist in timezone {1}")]
    NonexistentLocalTime(NaiveDate, Tz),
}

/// Resolve a period against a reference "today" into a concrete window.
///
/// Named periods offset the reference date by whole calendar days. A year
/// `Y` spans local midnight Jan 1 of `Y` up to (exclusive) local midnight
/// Jan 1 of `Y + 1`, in the timezone carried by `reference_today`.
pub fn resolve(period: PeriodSpec, reference_today: DateTime<Tz>) -> Result<TimeWindow, WindowError> {
    let tz = reference_today.timezone();
    let today = reference_today.date_naive();

    let day = match period {
        PeriodSpec::Yesterday => today.checked_sub_days(Days::new(1)),
        PeriodSpec::Today => Some(today),
        PeriodSpec::Tomorrow => today.checked_add_days(Days::new(1)),
        PeriodSpec::Year(year) => {
            let jan1 = |y: i32| {
                NaiveDate::from_ymd_opt(y, 1, 1)
                    .ok_or_else(|| WindowError::InvalidPeriod(y.to_string()))
            };
            return Ok(TimeWindow {
                start: local_midnight(tz, jan1(year)?)?,
                end: local_midnight(tz, jan1(year + 1)?)?,
            });
        }
    };
    let day = day.ok_or_else(|| WindowError::InvalidPeriod(period.to_string()))?;
    let next = day
        .checked_add_days(Days::new(1))
        .ok_or_else(|| WindowError::InvalidPeriod(period.to_string()))?;

    Ok(TimeWindow {
        start: local_midnight(tz, day)?,
        end: local_midnight(tz, next)?,
    })
}

/// Midnight of `day` in `tz`. Ambiguous wall times (fall-back overlap)
/// resolve to the earlier instant; a skipped midnight is an error.
fn local_midnight(tz: Tz, day: NaiveDate) -> Result<DateTime<Tz>, WindowError> {
    match tz.from_local_datetime(&day.and_time(NaiveTime::MIN)) {
        LocalResult::Single(t) => Ok(t),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier),
        LocalResult::None => Err(WindowError::NonexistentLocalTime(day, tz)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Berlin;

    fn reference(y: i32, m: u32, d: u32) -> DateTime<Tz> {
        Berlin.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn named_periods_offset_by_whole_days() {
        let today = reference(2024, 6, 15);

        let w = resolve(PeriodSpec::Yesterday, today).unwrap();
        assert_eq!(w.start, reference(2024, 6, 14));
        assert_eq!(w.end, today);

        let w = resolve(PeriodSpec::Today, today).unwrap();
        assert_eq!(w.start, today);
        assert_eq!(w.end, reference(2024, 6, 16));

        let w = resolve(PeriodSpec::Tomorrow, today).unwrap();
        assert_eq!(w.start, reference(2024, 6, 16));
        assert_eq!(w.end, reference(2024, 6, 17));
    }

    #[test]
    fn spring_forward_day_has_23_hour_slots() {
        // 2024-03-31 is the CET -> CEST transition in Europe/Berlin.
        let today = reference(2024, 4, 1);
        let w = resolve(PeriodSpec::Yesterday, today).unwrap();
        assert_eq!(w.hour_slots(), 23);
    }

    #[test]
    fn fall_back_day_has_25_hour_slots() {
        let today = reference(2024, 10, 27);
        let w = resolve(PeriodSpec::Today, today).unwrap();
        assert_eq!(w.hour_slots(), 25);
    }

    #[test]
    fn year_window_matches_leap_status() {
        let today = reference(2024, 6, 1);
        assert_eq!(resolve(PeriodSpec::Year(2023), today).unwrap().hour_slots(), 8760);
        assert_eq!(resolve(PeriodSpec::Year(2024), today).unwrap().hour_slots(), 8784);
    }

    #[test]
    fn adjacent_year_windows_share_a_boundary() {
        let today = reference(2024, 6, 1);
        let w23 = resolve(PeriodSpec::Year(2023), today).unwrap();
        let w24 = resolve(PeriodSpec::Year(2024), today).unwrap();
        assert_eq!(w23.end, w24.start);
    }

    #[test]
    fn parse_round_trips() {
        for s in ["yesterday", "today", "tomorrow", "2023"] {
            let p: PeriodSpec = s.parse().unwrap();
            assert_eq!(p.to_string(), s);
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = "next_week".parse::<PeriodSpec>().unwrap_err();
        assert!(matches!(err, WindowError::InvalidPeriod(_)));
    }
}
