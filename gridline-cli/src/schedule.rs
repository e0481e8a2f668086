//! Request planning — which (query, period) pairs a run covers.
//!
//! The plan is fixed by the settings and the wall clock: forecasts for
//! yesterday and today, actuals for yesterday, tomorrow's forecast once
//! the day-ahead publication deadline has passed, and one historical,
//! generation-by-source, and imports request per configured year up to
//! the current one.

use crate::settings::Settings;
use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;
use gridline_core::{PeriodSpec, QueryName};

#[derive(Debug)]
pub struct RequestPlan {
    pub requests: Vec<(QueryName, PeriodSpec)>,
    /// Informational notes to print before the run starts.
    pub notes: Vec<String>,
}

pub fn build_request_plan(settings: &Settings, now: DateTime<Tz>) -> RequestPlan {
    let mut requests = vec![
        (QueryName::Forecast, PeriodSpec::Yesterday),
        (QueryName::Forecast, PeriodSpec::Today),
        (QueryName::Historical, PeriodSpec::Yesterday),
    ];
    let mut notes = Vec::new();

    if now.time() < settings.day_ahead_deadline {
        notes.push(format!(
            "Day-ahead data for tomorrow not available until {:02}:{:02} today.",
            settings.day_ahead_deadline.hour(),
            settings.day_ahead_deadline.minute(),
        ));
    } else {
        requests.push((QueryName::Forecast, PeriodSpec::Tomorrow));
    }

    for year in settings.first_historical_year..=now.year() {
        requests.push((QueryName::Historical, PeriodSpec::Year(year)));
    }
    for year in settings.first_historical_year..=now.year() {
        requests.push((QueryName::GenerationBySource, PeriodSpec::Year(year)));
    }
    for year in settings.first_historical_year..=now.year() {
        requests.push((QueryName::Imports, PeriodSpec::Year(year)));
    }

    RequestPlan { requests, notes }
}
