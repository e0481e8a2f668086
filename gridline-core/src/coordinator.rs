//! Dataset coordinator — drives the (query, period) cross-product.
//!
//! For each requested pair the coordinator resolves the period into a
//! window, dispatches the query (internally retried per the executor's
//! policy), and assembles the result into an hourly table keyed by the
//! pair. Pair-local data failures degrade to absent/NaN columns; only
//! structural failures (unknown query, malformed period, rejected
//! credentials) abort the run, with an explicit cause.

use crate::query::{DispatchError, QueryName, QueryRegistry};
use crate::retry::FetchExecutor;
use crate::table::HourlyTable;
use crate::window::{resolve, PeriodSpec, WindowError};
use chrono::DateTime;
use chrono_tz::Tz;
use std::collections::BTreeMap;
use thiserror::Error;

/// The assembled output of one run: one hourly table per requested pair,
/// plus the warnings recorded for dropped series. Read-only once handed
/// to the exporter.
#[derive(Debug, Default)]
pub struct Dataset {
    tables: BTreeMap<(QueryName, PeriodSpec), HourlyTable>,
    warnings: Vec<String>,
}

impl Dataset {
    pub fn get(&self, name: QueryName, period: PeriodSpec) -> Option<&HourlyTable> {
        self.tables.get(&(name, period))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(QueryName, PeriodSpec), &HourlyTable)> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Export label for a pair, e.g. `historical_2023`.
    pub fn label(name: QueryName, period: PeriodSpec) -> String {
        format!("{name}_{period}")
    }
}

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Drives fetch and assembly for a set of (query, period) requests.
///
/// Single-threaded and synchronous: pairs are independent, but request
/// volumes are tens of calls per run, so sequential execution keeps the
/// failure handling simple.
pub struct DatasetCoordinator<'a> {
    registry: &'a QueryRegistry,
    executor: FetchExecutor<'a>,
    reference_today: DateTime<Tz>,
}

impl<'a> DatasetCoordinator<'a> {
    pub fn new(
        registry: &'a QueryRegistry,
        executor: FetchExecutor<'a>,
        reference_today: DateTime<Tz>,
    ) -> Self {
        Self {
            registry,
            executor,
            reference_today,
        }
    }

    /// Run every requested pair and assemble the dataset.
    pub fn run(
        &self,
        requests: &[(QueryName, PeriodSpec)],
    ) -> Result<Dataset, CoordinatorError> {
        let mut dataset = Dataset::default();

        for &(name, period) in requests {
            self.executor
                .observer()
                .on_query_start(&name.to_string(), &period.to_string());

            let window = resolve(period, self.reference_today)?;
            let result = self.registry.dispatch(name, &window, &self.executor)?;

            // A pair whose every series was dropped has no schema left;
            // it is omitted from the dataset rather than exported empty.
            if result.declared.is_empty() && !result.warnings.is_empty() {
                dataset.warnings.extend(result.warnings);
                continue;
            }

            let mut table = HourlyTable::empty(&window);
            for column in &result.declared {
                table.declare(column);
            }
            for (column, series) in &result.series {
                table.merge(column, series);
            }

            dataset.warnings.extend(result.warnings);
            dataset.tables.insert((name, period), table);
        }

        Ok(dataset)
    }
}
