//! Market data client trait and structured error types.
//!
//! The `MarketDataClient` trait abstracts over the remote energy-market
//! data provider so the retrieval pipeline can be exercised against a mock
//! and a real transport can be swapped in without touching the registry.
//! The retry layer sits above this trait — clients don't know about retries.

use crate::window::TimeWindow;
use crate::zone::{Technology, Zone};
use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use std::fmt;
use thiserror::Error;

/// A provider-native query type, with its per-call parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FetchKind {
    /// Day-ahead auction prices for the zone.
    DayAheadPrices,
    /// Total load for the zone.
    Load,
    /// Total generation across all technologies.
    Generation,
    /// Generation for a single technology category.
    GenerationByTech(Technology),
    /// Scheduled commercial exchange with one neighbour zone.
    ScheduledExchange { partner: Zone },
    /// Physical cross-border flow with one neighbour zone.
    CrossborderFlow { partner: Zone },
    /// Energy imported from one neighbour zone.
    ImportFrom { partner: Zone },
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchKind::DayAheadPrices => write!(f, "day-ahead prices"),
            FetchKind::Load => write!(f, "load"),
            FetchKind::Generation => write!(f, "generation"),
            FetchKind::GenerationByTech(t) => write!(f, "generation ({t})"),
            FetchKind::ScheduledExchange { partner } => {
                write!(f, "scheduled exchange with {partner}")
            }
            FetchKind::CrossborderFlow { partner } => {
                write!(f, "cross-border flow with {partner}")
            }
            FetchKind::ImportFrom { partner } => write!(f, "imports from {partner}"),
        }
    }
}

/// One timestamped numeric observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub at: DateTime<Tz>,
    pub value: f64,
}

/// A raw time-indexed series as returned by a client, at whatever
/// resolution the provider publishes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Resample to hourly resolution by taking the first sample in each
    /// hour bucket. Coarser-than-hourly input passes through with samples
    /// pinned to their containing hour.
    pub fn resample_hourly(&self) -> Series {
        let mut sorted = self.samples.clone();
        sorted.sort_by_key(|s| s.at.timestamp());

        let mut samples: Vec<Sample> = Vec::with_capacity(sorted.len());
        let mut last_bucket: Option<i64> = None;
        for sample in sorted {
            let ts = sample.at.timestamp();
            let bucket = ts - ts.rem_euclid(3600);
            if last_bucket == Some(bucket) {
                continue;
            }
            last_bucket = Some(bucket);
            let tz = sample.at.timezone();
            if let Some(at) = tz.timestamp_opt(bucket, 0).single() {
                samples.push(Sample {
                    at,
                    value: sample.value,
                });
            }
        }
        Series { samples }
    }
}

/// Structured error types for remote calls.
///
/// `NoMatchingData` is the provider's "nothing published for this window"
/// signal; the retry layer classifies it as a terminal empty result, never
/// as a failure.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no matching data for the requested window")]
    NoMatchingData,

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("credentials rejected: {0}")]
    Unauthorized(String),

    #[error("response format changed: {0}")]
    MalformedResponse(String),

    #[error("client error: {0}")]
    Other(String),
}

/// Trait for market data clients.
///
/// Implementations handle the specifics of one provider's transport. They
/// must surface "no data published" as `ClientError::NoMatchingData`,
/// distinct from transport failures.
pub trait MarketDataClient: Send + Sync {
    /// Human-readable name of this client.
    fn name(&self) -> &str;

    /// Fetch one raw series for a zone over a half-open window.
    fn fetch(&self, kind: FetchKind, zone: Zone, window: &TimeWindow)
        -> Result<Series, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Berlin;

    fn at(h: u32, m: u32) -> DateTime<Tz> {
        Berlin.with_ymd_and_hms(2024, 6, 15, h, m, 0).unwrap()
    }

    #[test]
    fn resample_takes_first_sample_per_hour() {
        let series = Series::new(vec![
            Sample { at: at(10, 0), value: 1.0 },
            Sample { at: at(10, 15), value: 2.0 },
            Sample { at: at(10, 30), value: 3.0 },
            Sample { at: at(11, 45), value: 4.0 },
        ]);

        let hourly = series.resample_hourly();
        assert_eq!(hourly.len(), 2);
        assert_eq!(hourly.samples[0].value, 1.0);
        assert_eq!(hourly.samples[1].value, 4.0);
        // The 11:45 sample is pinned to the top of its hour.
        assert_eq!(hourly.samples[1].at, at(11, 0));
    }

    #[test]
    fn resample_sorts_out_of_order_input() {
        let series = Series::new(vec![
            Sample { at: at(12, 30), value: 9.0 },
            Sample { at: at(12, 0), value: 5.0 },
        ]);
        let hourly = series.resample_hourly();
        assert_eq!(hourly.len(), 1);
        assert_eq!(hourly.samples[0].value, 5.0);
    }

    #[test]
    fn resample_of_empty_series_is_empty() {
        assert!(Series::default().resample_hourly().is_empty());
    }
}
