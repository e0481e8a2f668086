//! Retrying fetch executor — classification-based retry/skip policy.
//!
//! Every remote call in the pipeline goes through `FetchExecutor::fetch`,
//! which turns exception-style client errors into an explicit outcome value:
//!
//! - "no matching data" is a terminal success with an empty result;
//! - credential rejection is fatal and propagates;
//! - anything else is retried up to the bound, then the series is dropped
//!   with a recorded warning — never fatal to the run.

use crate::client::{ClientError, FetchKind, MarketDataClient, Series};
use crate::window::TimeWindow;
use crate::zone::Zone;

/// Additional attempts after the first failed call.
pub const DEFAULT_EXTRA_ATTEMPTS: u32 = 2;

/// The classified outcome of one fetch, after retries.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The call succeeded and returned data.
    Series(Series),
    /// The provider has nothing published for this window. Expected and
    /// common (e.g. tomorrow's auction before publication).
    NoData,
    /// The retry bound was exhausted; the series is dropped and the run
    /// continues without it. Carries the warning to record.
    Dropped { warning: String },
}

/// Progress callbacks for a retrieval run.
///
/// Cosmetic only: nothing in the pipeline's output depends on an observer.
pub trait RunObserver: Send + Sync {
    /// Called when the coordinator starts a (query, period) pair.
    fn on_query_start(&self, query: &str, period: &str);

    /// Called for every remote call attempt about to be issued.
    fn on_fetch(&self, kind: FetchKind, window: &TimeWindow);

    /// Called when the provider reports no data for the window.
    fn on_no_data(&self, kind: FetchKind);

    /// Called before a retry of a failed call.
    fn on_retry(&self, kind: FetchKind, attempt: u32, error: &ClientError);

    /// Called when the retry bound is exhausted and the series is dropped.
    fn on_dropped(&self, kind: FetchKind, attempts: u32, error: &ClientError);
}

/// Observer that prints to stdout.
pub struct StdoutReporter;

impl RunObserver for StdoutReporter {
    fn on_query_start(&self, query: &str, period: &str) {
        println!("Requesting data: {query}, {period}.");
    }

    fn on_fetch(&self, kind: FetchKind, window: &TimeWindow) {
        println!("  fetching {kind} for {window}");
    }

    fn on_no_data(&self, kind: FetchKind) {
        println!("  no data published for {kind}");
    }

    fn on_retry(&self, kind: FetchKind, attempt: u32, error: &ClientError) {
        println!("  retrying {kind} (attempt {attempt} failed: {error})");
    }

    fn on_dropped(&self, kind: FetchKind, attempts: u32, error: &ClientError) {
        println!("WARNING: dropping {kind} after {attempts} attempts: {error}");
    }
}

/// Observer that discards everything. Used in tests.
pub struct SilentObserver;

impl RunObserver for SilentObserver {
    fn on_query_start(&self, _query: &str, _period: &str) {}
    fn on_fetch(&self, _kind: FetchKind, _window: &TimeWindow) {}
    fn on_no_data(&self, _kind: FetchKind) {}
    fn on_retry(&self, _kind: FetchKind, _attempt: u32, _error: &ClientError) {}
    fn on_dropped(&self, _kind: FetchKind, _attempts: u32, _error: &ClientError) {}
}

/// Wraps a market data client with the bounded-retry policy.
pub struct FetchExecutor<'a> {
    client: &'a dyn MarketDataClient,
    observer: &'a dyn RunObserver,
    extra_attempts: u32,
}

impl<'a> FetchExecutor<'a> {
    pub fn new(client: &'a dyn MarketDataClient, observer: &'a dyn RunObserver) -> Self {
        Self {
            client,
            observer,
            extra_attempts: DEFAULT_EXTRA_ATTEMPTS,
        }
    }

    pub fn with_extra_attempts(mut self, extra_attempts: u32) -> Self {
        self.extra_attempts = extra_attempts;
        self
    }

    pub fn observer(&self) -> &dyn RunObserver {
        self.observer
    }

    /// Issue one remote call with classification and bounded retry.
    ///
    /// Only credential rejection escapes as `Err`; every data-level failure
    /// is folded into the returned `FetchOutcome`.
    pub fn fetch(
        &self,
        kind: FetchKind,
        zone: Zone,
        window: &TimeWindow,
    ) -> Result<FetchOutcome, ClientError> {
        self.observer.on_fetch(kind, window);

        let mut last_error: Option<ClientError> = None;
        for attempt in 0..=self.extra_attempts {
            match self.client.fetch(kind, zone, window) {
                Ok(series) => return Ok(FetchOutcome::Series(series)),
                Err(ClientError::NoMatchingData) => {
                    self.observer.on_no_data(kind);
                    return Ok(FetchOutcome::NoData);
                }
                Err(err @ ClientError::Unauthorized(_)) => return Err(err),
                Err(err) => {
                    if attempt < self.extra_attempts {
                        self.observer.on_retry(kind, attempt + 1, &err);
                    }
                    last_error = Some(err);
                }
            }
        }

        let attempts = self.extra_attempts + 1;
        let error =
            last_error.unwrap_or_else(|| ClientError::Other("retry bound exhausted".into()));
        self.observer.on_dropped(kind, attempts, &error);
        Ok(FetchOutcome::Dropped {
            warning: format!("{kind}: dropped after {attempts} attempts: {error}"),
        })
    }
}
