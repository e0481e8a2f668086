//! Hourly table assembly.
//!
//! An `HourlyTable` is a contiguous hourly timestamp index over a half-open
//! window plus named numeric columns aligned to it. Missing observations
//! are strict NaN — no forward-fill, no row dropping. Columns can be
//! declared up front so sparse data still yields a stable schema.

use crate::client::Series;
use crate::window::TimeWindow;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct HourlyTable {
    index: Vec<DateTime<Tz>>,
    /// Unix timestamp of each index entry → row position.
    slots: HashMap<i64, usize>,
    /// Column order as declared/merged.
    names: Vec<String>,
    columns: HashMap<String, Vec<f64>>,
}

impl HourlyTable {
    /// Build an empty table whose index covers `[window.start, window.end)`
    /// at hourly resolution. No trailing entry at `window.end` itself.
    ///
    /// The hour step is absolute time, so a window across a spring-forward
    /// boundary yields 23 rows per day, and a fall-back day 25.
    pub fn empty(window: &TimeWindow) -> Self {
        let mut index = Vec::with_capacity(window.hour_slots());
        let mut t = window.start;
        while t < window.end {
            index.push(t);
            t += Duration::hours(1);
        }
        let slots = index
            .iter()
            .enumerate()
            .map(|(row, at)| (at.timestamp(), row))
            .collect();
        Self {
            index,
            slots,
            names: Vec::new(),
            columns: HashMap::new(),
        }
    }

    /// Declare a column, pre-filled with NaN. No-op if it already exists.
    pub fn declare(&mut self, name: &str) {
        if !self.columns.contains_key(name) {
            self.names.push(name.to_string());
            self.columns
                .insert(name.to_string(), vec![f64::NAN; self.index.len()]);
        }
    }

    /// Merge a series into the named column by timestamp alignment.
    ///
    /// The series is expected to already be at hourly resolution (the
    /// simple-query layer resamples before merge); samples whose timestamp
    /// falls outside the index are discarded. Declares the column first if
    /// needed, so an empty series still leaves an all-NaN column behind.
    pub fn merge(&mut self, name: &str, series: &Series) {
        self.declare(name);
        if let Some(column) = self.columns.get_mut(name) {
            for sample in &series.samples {
                if let Some(&row) = self.slots.get(&sample.at.timestamp()) {
                    column[row] = sample.value;
                }
            }
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The hourly timestamp index.
    pub fn index(&self) -> &[DateTime<Tz>] {
        &self.index
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// True if the column exists and holds at least one non-NaN value.
    pub fn column_has_data(&self, name: &str) -> bool {
        self.column(name)
            .is_some_and(|values| values.iter().any(|v| !v.is_nan()))
    }

    /// Values of one row in column order.
    pub fn row(&self, row: usize) -> Vec<f64> {
        self.names
            .iter()
            .map(|name| self.columns[name][row])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Sample;
    use crate::window::{resolve, PeriodSpec};
    use chrono::TimeZone;
    use chrono_tz::Europe::Berlin;
    use chrono_tz::Tz;

    fn day_window(y: i32, m: u32, d: u32) -> TimeWindow {
        let today = Berlin.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
        resolve(PeriodSpec::Today, today).unwrap()
    }

    fn hourly_series(window: &TimeWindow, base: f64) -> Series {
        let samples = HourlyTable::empty(window)
            .index()
            .iter()
            .enumerate()
            .map(|(i, &at)| Sample {
                at,
                value: base + i as f64,
            })
            .collect();
        Series::new(samples)
    }

    #[test]
    fn empty_table_covers_half_open_window() {
        let window = day_window(2024, 6, 15);
        let table = HourlyTable::empty(&window);
        assert_eq!(table.len(), 24);
        assert_eq!(table.index()[0], window.start);
        assert!(*table.index().last().unwrap() < window.end);
    }

    #[test]
    fn empty_table_is_idempotent() {
        let window = day_window(2024, 6, 15);
        let a = HourlyTable::empty(&window);
        let b = HourlyTable::empty(&window);
        assert_eq!(a.index(), b.index());
    }

    #[test]
    fn spring_forward_day_yields_23_rows() {
        let table = HourlyTable::empty(&day_window(2024, 3, 31));
        assert_eq!(table.len(), 23);
    }

    #[test]
    fn merge_aligns_by_timestamp() {
        let window = day_window(2024, 6, 15);
        let mut table = HourlyTable::empty(&window);
        table.merge("load [MW]", &hourly_series(&window, 100.0));

        let values = table.column("load [MW]").unwrap();
        assert_eq!(values[0], 100.0);
        assert_eq!(values[23], 123.0);
    }

    #[test]
    fn merge_of_empty_series_leaves_all_nan_column() {
        let window = day_window(2024, 6, 15);
        let mut table = HourlyTable::empty(&window);
        table.merge("load [MW]", &Series::default());

        assert_eq!(table.len(), 24);
        assert!(table.column("load [MW]").unwrap().iter().all(|v| v.is_nan()));
        assert!(!table.column_has_data("load [MW]"));
    }

    #[test]
    fn samples_outside_the_index_are_discarded() {
        let window = day_window(2024, 6, 15);
        let mut table = HourlyTable::empty(&window);
        // The provider returned an inclusive boundary row at window.end.
        let boundary: DateTime<Tz> = window.end;
        table.merge(
            "load [MW]",
            &Series::new(vec![Sample {
                at: boundary,
                value: 1.0,
            }]),
        );
        assert_eq!(table.len(), 24);
        assert!(!table.column_has_data("load [MW]"));
    }

    #[test]
    fn declared_columns_keep_order() {
        let window = day_window(2024, 6, 15);
        let mut table = HourlyTable::empty(&window);
        table.declare("b");
        table.declare("a");
        table.declare("b");
        assert_eq!(table.column_names(), ["b", "a"]);
    }
}
