//! Query registry — named query variants and dispatch.
//!
//! A query is either *simple* (exactly one remote call, renamed to a
//! canonical column) or *composite* (an ordered dependency list whose
//! results are merged by column union on the common time axis). The full
//! variant set is resolved when the registry is built, so an unknown
//! dependency fails before any remote call is attempted.
//!
//! Composites recurse through the same dispatch path as top-level queries,
//! which keeps the retry/skip policy uniform at every level: the
//! per-neighbour exchange queries and the per-technology generation queries
//! are ordinary registry entries the composites depend on.

use crate::client::{FetchKind, Series};
use crate::retry::{FetchExecutor, FetchOutcome};
use crate::window::TimeWindow;
use crate::zone::{Technology, Zone};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A logical query identifier.
///
/// The first nine variants are the public names accepted in configuration;
/// the parameterized variants are leaves registered per neighbour zone and
/// per technology, reached only through composite dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueryName {
    DayAheadPrices,
    Load,
    Generation,
    Imports,
    ScheduledExchanges,
    CrossborderExchange,
    GenerationBySource,
    Forecast,
    Historical,
    /// Scheduled exchange with one neighbour.
    ExchangeWith(Zone),
    /// Physical cross-border flow with one neighbour.
    FlowWith(Zone),
    /// Imports from one neighbour.
    ImportFrom(Zone),
    /// Generation for one technology.
    GenerationOf(Technology),
}

impl fmt::Display for QueryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryName::DayAheadPrices => write!(f, "day_ahead_prices"),
            QueryName::Load => write!(f, "load"),
            QueryName::Generation => write!(f, "generation"),
            QueryName::Imports => write!(f, "imports"),
            QueryName::ScheduledExchanges => write!(f, "scheduled_exchanges"),
            QueryName::CrossborderExchange => write!(f, "crossborder_exchange"),
            QueryName::GenerationBySource => write!(f, "generation_by_source"),
            QueryName::Forecast => write!(f, "forecast"),
            QueryName::Historical => write!(f, "historical"),
            QueryName::ExchangeWith(zone) => write!(f, "scheduled_exchange_{}", zone.code()),
            QueryName::FlowWith(zone) => write!(f, "crossborder_flow_{}", zone.code()),
            QueryName::ImportFrom(zone) => write!(f, "imports_{}", zone.code()),
            QueryName::GenerationOf(tech) => write!(f, "generation_{}", tech.code()),
        }
    }
}

impl FromStr for QueryName {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day_ahead_prices" => Ok(QueryName::DayAheadPrices),
            "load" => Ok(QueryName::Load),
            "generation" => Ok(QueryName::Generation),
            "imports" => Ok(QueryName::Imports),
            "scheduled_exchanges" => Ok(QueryName::ScheduledExchanges),
            "crossborder_exchange" => Ok(QueryName::CrossborderExchange),
            "generation_by_source" => Ok(QueryName::GenerationBySource),
            "forecast" => Ok(QueryName::Forecast),
            "historical" => Ok(QueryName::Historical),
            other => Err(QueryError::UnknownQuery(other.to_string())),
        }
    }
}

/// Errors from registry construction and dispatch.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown query '{0}'")]
    UnknownQuery(String),

    #[error("query '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("query '{name}' depends on unregistered query '{dependency}'")]
    UnknownDependency { name: String, dependency: String },
}

/// The result of one dispatched query: the declared column schema plus the
/// columns that actually carry data. Absence of data keeps the declared
/// names intact with an empty series map.
#[derive(Debug, Default)]
pub struct QueryResult {
    /// Every column this query promises, in stable order.
    pub declared: Vec<String>,
    /// Columns with data, hourly-resampled.
    pub series: BTreeMap<String, Series>,
    /// Warnings accumulated for dropped series.
    pub warnings: Vec<String>,
}

impl QueryResult {
    /// True when no column carries data.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Absorb another result: column union, preserving declaration order
    /// and skipping duplicates.
    fn absorb(&mut self, other: QueryResult) {
        for name in other.declared {
            if !self.declared.contains(&name) {
                self.declared.push(name);
            }
        }
        self.series.extend(other.series);
        self.warnings.extend(other.warnings);
    }
}

/// One registered query variant.
#[derive(Debug, Clone)]
pub enum QuerySpec {
    /// One remote call, renamed to a canonical column.
    Simple { kind: FetchKind, column: String },
    /// Ordered dependency list, merged by column union.
    Composite { deps: Vec<QueryName> },
}

/// The catalogue of query variants for one zone.
pub struct QueryRegistry {
    zone: Zone,
    entries: BTreeMap<QueryName, QuerySpec>,
}

impl QueryRegistry {
    /// An empty registry for the zone. Use `standard` for the built-in set.
    pub fn new(zone: Zone) -> Self {
        Self {
            zone,
            entries: BTreeMap::new(),
        }
    }

    /// Build the standard catalogue for a zone: the simple leaves, one
    /// exchange/flow/import leaf per neighbour, one generation leaf per
    /// technology, and the composites over them.
    pub fn standard(zone: Zone) -> Self {
        let mut registry = Self::new(zone);

        let builtin = |registry: &mut Self, name: QueryName, spec: QuerySpec| {
            registry
                .register(name, spec)
                .expect("built-in query registered twice");
        };

        builtin(
            &mut registry,
            QueryName::DayAheadPrices,
            QuerySpec::Simple {
                kind: FetchKind::DayAheadPrices,
                column: "energy_prices [EUR/MWh]".into(),
            },
        );
        builtin(
            &mut registry,
            QueryName::Load,
            QuerySpec::Simple {
                kind: FetchKind::Load,
                column: "load [MW]".into(),
            },
        );
        builtin(
            &mut registry,
            QueryName::Generation,
            QuerySpec::Simple {
                kind: FetchKind::Generation,
                column: "generation [MW]".into(),
            },
        );
        let mut exchanges = Vec::new();
        let mut flows = Vec::new();
        let mut imports = Vec::new();
        for &partner in zone.neighbours() {
            builtin(
                &mut registry,
                QueryName::ExchangeWith(partner),
                QuerySpec::Simple {
                    kind: FetchKind::ScheduledExchange { partner },
                    column: format!("scheduled_exchange {} [MW]", partner.code()),
                },
            );
            exchanges.push(QueryName::ExchangeWith(partner));

            builtin(
                &mut registry,
                QueryName::FlowWith(partner),
                QuerySpec::Simple {
                    kind: FetchKind::CrossborderFlow { partner },
                    column: format!("crossborder_flow {} [MW]", partner.code()),
                },
            );
            flows.push(QueryName::FlowWith(partner));

            builtin(
                &mut registry,
                QueryName::ImportFrom(partner),
                QuerySpec::Simple {
                    kind: FetchKind::ImportFrom { partner },
                    column: format!("imports {} [MW]", partner.code()),
                },
            );
            imports.push(QueryName::ImportFrom(partner));
        }

        let mut by_source = Vec::new();
        for tech in Technology::ALL {
            builtin(
                &mut registry,
                QueryName::GenerationOf(tech),
                QuerySpec::Simple {
                    kind: FetchKind::GenerationByTech(tech),
                    column: format!("generation {} [MW]", tech.label()),
                },
            );
            by_source.push(QueryName::GenerationOf(tech));
        }

        builtin(
            &mut registry,
            QueryName::ScheduledExchanges,
            QuerySpec::Composite { deps: exchanges },
        );
        builtin(
            &mut registry,
            QueryName::CrossborderExchange,
            QuerySpec::Composite { deps: flows },
        );
        builtin(
            &mut registry,
            QueryName::GenerationBySource,
            QuerySpec::Composite { deps: by_source },
        );
        builtin(
            &mut registry,
            QueryName::Imports,
            QuerySpec::Composite { deps: imports },
        );
        builtin(
            &mut registry,
            QueryName::Forecast,
            QuerySpec::Composite {
                deps: vec![
                    QueryName::DayAheadPrices,
                    QueryName::Load,
                    QueryName::GenerationOf(Technology::Solar),
                    QueryName::GenerationOf(Technology::WindOnshore),
                    QueryName::ScheduledExchanges,
                ],
            },
        );
        builtin(
            &mut registry,
            QueryName::Historical,
            QuerySpec::Composite {
                deps: vec![
                    QueryName::DayAheadPrices,
                    QueryName::Load,
                    QueryName::Generation,
                    QueryName::GenerationOf(Technology::Solar),
                    QueryName::GenerationOf(Technology::WindOnshore),
                    QueryName::CrossborderExchange,
                    QueryName::Imports,
                ],
            },
        );

        registry
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Register a query variant. Fails fast on re-registration and on
    /// composite dependencies that are not registered yet — dependency
    /// names are resolved here, not at dispatch time.
    pub fn register(&mut self, name: QueryName, spec: QuerySpec) -> Result<(), QueryError> {
        if self.entries.contains_key(&name) {
            return Err(QueryError::AlreadyRegistered(name.to_string()));
        }
        if let QuerySpec::Composite { deps } = &spec {
            for dep in deps {
                if !self.entries.contains_key(dep) {
                    return Err(QueryError::UnknownDependency {
                        name: name.to_string(),
                        dependency: dep.to_string(),
                    });
                }
            }
        }
        self.entries.insert(name, spec);
        Ok(())
    }

    pub fn contains(&self, name: QueryName) -> bool {
        self.entries.contains_key(&name)
    }

    /// Registered names in stable order.
    pub fn names(&self) -> impl Iterator<Item = QueryName> + '_ {
        self.entries.keys().copied()
    }

    /// Dispatch a query for a window. Simple variants issue one remote call
    /// through the executor; composites recurse over their dependencies and
    /// merge columns by union. Given the same window and registry state,
    /// dispatch is referentially transparent.
    pub fn dispatch(
        &self,
        name: QueryName,
        window: &TimeWindow,
        executor: &FetchExecutor<'_>,
    ) -> Result<QueryResult, DispatchError> {
        let spec = self
            .entries
            .get(&name)
            .ok_or_else(|| QueryError::UnknownQuery(name.to_string()))?;

        match spec {
            QuerySpec::Simple { kind, column } => {
                let mut result = QueryResult::default();
                match executor.fetch(*kind, self.zone, window)? {
                    FetchOutcome::Series(series) => {
                        result.declared.push(column.clone());
                        result.series.insert(column.clone(), series.resample_hourly());
                    }
                    // No published data keeps the declared schema: the
                    // column shows up all-NaN downstream.
                    FetchOutcome::NoData => result.declared.push(column.clone()),
                    // A dropped series loses its column entirely.
                    FetchOutcome::Dropped { warning } => result.warnings.push(warning),
                }
                Ok(result)
            }
            QuerySpec::Composite { deps } => {
                let mut result = QueryResult::default();
                for &dep in deps {
                    result.absorb(self.dispatch(dep, window, executor)?);
                }
                Ok(result)
            }
        }
    }
}

/// Errors escaping dispatch: structural (unknown name) or fatal client
/// failures (rejected credentials). Data-level failures never appear here.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Client(#[from] crate::client::ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_has_all_public_names() {
        let registry = QueryRegistry::standard(Zone::DeLu);
        for name in [
            QueryName::DayAheadPrices,
            QueryName::Load,
            QueryName::Generation,
            QueryName::Imports,
            QueryName::ScheduledExchanges,
            QueryName::CrossborderExchange,
            QueryName::GenerationBySource,
            QueryName::Forecast,
            QueryName::Historical,
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn re_registration_fails_fast() {
        let mut registry = QueryRegistry::standard(Zone::At);
        let err = registry
            .register(
                QueryName::Load,
                QuerySpec::Simple {
                    kind: FetchKind::Load,
                    column: "load [MW]".into(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, QueryError::AlreadyRegistered(_)));
    }

    #[test]
    fn composite_with_unknown_dependency_is_rejected() {
        let mut registry = QueryRegistry::new(Zone::At);
        let err = registry
            .register(
                QueryName::Forecast,
                QuerySpec::Composite {
                    deps: vec![QueryName::Load],
                },
            )
            .unwrap_err();
        assert!(matches!(err, QueryError::UnknownDependency { .. }));
    }

    #[test]
    fn public_names_parse() {
        for s in [
            "day_ahead_prices",
            "load",
            "generation",
            "imports",
            "scheduled_exchanges",
            "crossborder_exchange",
            "generation_by_source",
            "forecast",
            "historical",
        ] {
            let name: QueryName = s.parse().unwrap();
            assert_eq!(name.to_string(), s);
        }
        assert!("prices".parse::<QueryName>().is_err());
    }
}
