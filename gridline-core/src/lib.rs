//! Gridline Core — energy-market time-series retrieval pipeline.
//!
//! This crate contains the retrieval pipeline:
//! - Time window resolution (named/numeric periods, DST-aware)
//! - Zone and generation-technology reference tables
//! - Market data client trait with a deterministic mock implementation
//! - Retrying fetch executor with no-data/transient/fatal classification
//! - Query registry (simple and composite variants) with uniform dispatch
//! - Hourly table assembly and the dataset coordinator
//!
//! The remote transport itself is out of scope: everything runs against
//! the `MarketDataClient` trait.

pub mod client;
pub mod coordinator;
pub mod mock;
pub mod query;
pub mod retry;
pub mod table;
pub mod window;
pub mod zone;

pub use client::{ClientError, FetchKind, MarketDataClient, Sample, Series};
pub use coordinator::{CoordinatorError, Dataset, DatasetCoordinator};
pub use mock::MockMarketClient;
pub use query::{DispatchError, QueryError, QueryName, QueryRegistry, QueryResult, QuerySpec};
pub use retry::{
    FetchExecutor, FetchOutcome, RunObserver, SilentObserver, StdoutReporter,
    DEFAULT_EXTRA_ATTEMPTS,
};
pub use table::HourlyTable;
pub use window::{resolve, PeriodSpec, TimeWindow, WindowError};
pub use zone::{Technology, UnknownZone, Zone};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: pipeline types are Send + Sync so a future
    /// parallel coordinator can fan pairs out across threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<PeriodSpec>();
        require_sync::<PeriodSpec>();
        require_send::<TimeWindow>();
        require_sync::<TimeWindow>();
        require_send::<Zone>();
        require_sync::<Zone>();
        require_send::<Technology>();
        require_sync::<Technology>();
        require_send::<FetchKind>();
        require_sync::<FetchKind>();
        require_send::<Series>();
        require_sync::<Series>();
        require_send::<QueryName>();
        require_sync::<QueryName>();
        require_send::<QueryResult>();
        require_sync::<QueryResult>();
        require_send::<HourlyTable>();
        require_sync::<HourlyTable>();
        require_send::<Dataset>();
        require_sync::<Dataset>();
        require_send::<MockMarketClient>();
        require_sync::<MockMarketClient>();
    }
}
