//! Deterministic mock market data client.
//!
//! Generates seeded synthetic series per fetch kind so tests and dry runs
//! are reproducible, and supports injecting the provider's failure modes:
//! no-data responses for selected kinds, bounded transient failures, and
//! credential rejection.

use crate::client::{ClientError, FetchKind, MarketDataClient, Sample, Series};
use crate::window::TimeWindow;
use crate::zone::{Technology, Zone};
use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

pub struct MockMarketClient {
    seed: u64,
    api_token: String,
    no_data: HashSet<FetchKind>,
    unauthorized: bool,
    transient: Mutex<HashMap<FetchKind, u32>>,
    calls: Mutex<Vec<FetchKind>>,
}

impl MockMarketClient {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            api_token: "mock-token".into(),
            no_data: HashSet::new(),
            unauthorized: false,
            transient: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Authenticate with the given token. The mock mimics the provider's
    /// check: any non-blank token is accepted, a blank one is rejected on
    /// every call.
    pub fn with_api_token(mut self, token: &str) -> Self {
        self.api_token = token.to_string();
        self
    }

    /// Make the given kind report `NoMatchingData` for every window.
    pub fn with_no_data(mut self, kind: FetchKind) -> Self {
        self.no_data.insert(kind);
        self
    }

    /// Make the given kind fail transiently `count` times before
    /// succeeding. Use a large count to exhaust any retry bound.
    pub fn with_transient_failures(self, kind: FetchKind, count: u32) -> Self {
        self.transient.lock().unwrap().insert(kind, count);
        self
    }

    /// Reject every call with a credential error.
    pub fn with_rejected_credentials(mut self) -> Self {
        self.unauthorized = true;
        self
    }

    /// Every fetch issued so far, in call order.
    pub fn calls(&self) -> Vec<FetchKind> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, kind: FetchKind) -> usize {
        self.calls.lock().unwrap().iter().filter(|&&k| k == kind).count()
    }

    /// Synthetic series: a kind-specific daily shape plus seeded noise.
    /// Load is published at quarter-hour resolution (like the real
    /// provider), everything else hourly.
    fn generate(&self, kind: FetchKind, window: &TimeWindow) -> Series {
        let mut hasher = DefaultHasher::new();
        kind.hash(&mut hasher);
        window.start.timestamp().hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(self.seed ^ hasher.finish());

        let (base, amplitude, noise) = shape(kind);
        let step = match kind {
            FetchKind::Load => Duration::minutes(15),
            _ => Duration::hours(1),
        };

        let mut samples = Vec::new();
        let mut t = window.start;
        let mut i = 0u32;
        while t < window.end {
            let phase = f64::from(i) * 0.26;
            let value = base + amplitude * phase.sin() + rng.gen_range(-noise..=noise);
            samples.push(Sample { at: t, value });
            t += step;
            i += 1;
        }
        Series::new(samples)
    }
}

/// (base, amplitude, noise) of the synthetic daily profile per kind.
fn shape(kind: FetchKind) -> (f64, f64, f64) {
    match kind {
        FetchKind::DayAheadPrices => (55.0, 25.0, 4.0),
        FetchKind::Load => (9_500.0, 1_800.0, 120.0),
        FetchKind::Generation => (8_800.0, 1_500.0, 100.0),
        FetchKind::GenerationByTech(tech) => {
            // Spread the technologies over distinct magnitudes.
            let rank = Technology::ALL.iter().position(|&t| t == tech).unwrap_or(0);
            let base = 120.0 + 90.0 * rank as f64;
            (base, base * 0.4, base * 0.05)
        }
        FetchKind::ScheduledExchange { .. } => (150.0, 400.0, 30.0),
        FetchKind::CrossborderFlow { .. } => (100.0, 450.0, 35.0),
        FetchKind::ImportFrom { .. } => (250.0, 600.0, 40.0),
    }
}

impl MarketDataClient for MockMarketClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(
        &self,
        kind: FetchKind,
        _zone: Zone,
        window: &TimeWindow,
    ) -> Result<Series, ClientError> {
        self.calls.lock().unwrap().push(kind);

        if self.unauthorized || self.api_token.trim().is_empty() {
            return Err(ClientError::Unauthorized("invalid API token".into()));
        }
        if self.no_data.contains(&kind) {
            return Err(ClientError::NoMatchingData);
        }
        if let Some(left) = self.transient.lock().unwrap().get_mut(&kind) {
            if *left > 0 {
                *left -= 1;
                return Err(ClientError::NetworkUnreachable("injected failure".into()));
            }
        }
        Ok(self.generate(kind, window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{resolve, PeriodSpec};
    use chrono::TimeZone;
    use chrono_tz::Europe::Berlin;

    fn window() -> TimeWindow {
        let today = Berlin.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        resolve(PeriodSpec::Today, today).unwrap()
    }

    #[test]
    fn same_seed_same_series() {
        let a = MockMarketClient::new(7);
        let b = MockMarketClient::new(7);
        let w = window();
        assert_eq!(
            a.fetch(FetchKind::Load, Zone::DeLu, &w).unwrap(),
            b.fetch(FetchKind::Load, Zone::DeLu, &w).unwrap(),
        );
    }

    #[test]
    fn load_is_quarter_hourly() {
        let client = MockMarketClient::new(1);
        let series = client.fetch(FetchKind::Load, Zone::DeLu, &window()).unwrap();
        assert_eq!(series.len(), 24 * 4);
    }

    #[test]
    fn prices_are_hourly() {
        let client = MockMarketClient::new(1);
        let series = client
            .fetch(FetchKind::DayAheadPrices, Zone::DeLu, &window())
            .unwrap();
        assert_eq!(series.len(), 24);
    }

    #[test]
    fn injected_no_data_surfaces_as_classified_error() {
        let client = MockMarketClient::new(1).with_no_data(FetchKind::Generation);
        let err = client
            .fetch(FetchKind::Generation, Zone::DeLu, &window())
            .unwrap_err();
        assert!(matches!(err, ClientError::NoMatchingData));
    }

    #[test]
    fn transient_failures_run_out() {
        let kind = FetchKind::ImportFrom { partner: Zone::Fr };
        let client = MockMarketClient::new(1).with_transient_failures(kind, 2);
        let w = window();
        assert!(client.fetch(kind, Zone::DeLu, &w).is_err());
        assert!(client.fetch(kind, Zone::DeLu, &w).is_err());
        assert!(client.fetch(kind, Zone::DeLu, &w).is_ok());
        assert_eq!(client.call_count(kind), 3);
    }

    #[test]
    fn blank_api_token_is_rejected() {
        let client = MockMarketClient::new(1).with_api_token("  ");
        let err = client.fetch(FetchKind::Load, Zone::DeLu, &window()).unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized(_)));
    }
}
