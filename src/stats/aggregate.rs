//! Aggregation Module
//! Partitions records by a categorical dimension and reduces each partition.

use crate::data::Dataset;
use crate::error::SchemaMismatchError;
use polars::prelude::PolarsError;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info_span};

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid measure '{0}': expected count, sum:COLUMN or mean:COLUMN")]
pub struct MeasureParseError(String);

/// Combines the values of one partition into a summary value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Sum,
    Mean,
    Count,
}

/// A reducer applied to a column. `Count` counts records and reads no column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Measure {
    pub reducer: Reducer,
    pub column: Option<String>,
}

impl Measure {
    pub fn sum(column: impl Into<String>) -> Self {
        Self {
            reducer: Reducer::Sum,
            column: Some(column.into()),
        }
    }

    pub fn mean(column: impl Into<String>) -> Self {
        Self {
            reducer: Reducer::Mean,
            column: Some(column.into()),
        }
    }

    pub fn count() -> Self {
        Self {
            reducer: Reducer::Count,
            column: None,
        }
    }

    /// Header used when the measure is displayed.
    pub fn label(&self) -> String {
        match (&self.reducer, &self.column) {
            (Reducer::Sum, Some(c)) => format!("sum({c})"),
            (Reducer::Mean, Some(c)) => format!("mean({c})"),
            _ => "count".to_string(),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Measure {
    type Err = MeasureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("count") {
            return Ok(Self::count());
        }
        let (reducer, column) = s
            .split_once(':')
            .ok_or_else(|| MeasureParseError(s.to_string()))?;
        let column = column.trim();
        if column.is_empty() {
            return Err(MeasureParseError(s.to_string()));
        }
        match reducer.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::sum(column)),
            "mean" | "avg" => Ok(Self::mean(column)),
            _ => Err(MeasureParseError(s.to_string())),
        }
    }
}

/// Summary of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// Records assigned to the group.
    pub records: usize,
    /// One value per measure; `None` when no record had a numeric value.
    pub values: Vec<Option<f64>>,
}

/// Grouped summary values keyed by the dimension's distinct values.
///
/// Key order carries no meaning; use the sorting helpers for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub dimension: String,
    pub measures: Vec<Measure>,
    pub groups: BTreeMap<String, GroupSummary>,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&GroupSummary> {
        self.groups.get(key)
    }

    /// Value of measure `index` for `key`.
    pub fn value(&self, key: &str, index: usize) -> Option<f64> {
        self.groups
            .get(key)
            .and_then(|g| g.values.get(index).copied().flatten())
    }

    /// Sum of per-group record counts.
    pub fn total_records(&self) -> usize {
        self.groups.values().map(|g| g.records).sum()
    }

    /// Groups ordered by measure `index`. Absent values sort last, ties by key.
    pub fn sorted_by(&self, index: usize, descending: bool) -> Vec<(&String, &GroupSummary)> {
        let mut rows: Vec<(&String, &GroupSummary)> = self.groups.iter().collect();
        rows.sort_by(|(ka, a), (kb, b)| {
            let va = a.values.get(index).copied().flatten();
            let vb = b.values.get(index).copied().flatten();
            let by_value = match (va, vb) {
                (Some(x), Some(y)) if descending => y.total_cmp(&x),
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_value.then_with(|| ka.cmp(kb))
        });
        rows
    }

    /// Groups in key order.
    pub fn by_key(&self) -> Vec<(&String, &GroupSummary)> {
        self.groups.iter().collect()
    }

    /// Groups listed in `labels` order first, then any others by key.
    pub fn in_order(&self, labels: &[&str]) -> Vec<(&String, &GroupSummary)> {
        let mut rows: Vec<(&String, &GroupSummary)> = labels
            .iter()
            .filter_map(|label| self.groups.get_key_value(*label))
            .collect();
        rows.extend(
            self.groups
                .iter()
                .filter(|(key, _)| !labels.contains(&key.as_str())),
        );
        rows
    }
}

struct Partial {
    records: usize,
    sums: Vec<f64>,
    counts: Vec<usize>,
}

/// Computes grouped aggregations over a dataset.
pub struct Aggregator;

impl Aggregator {
    /// Partition `dataset` by `dimension` and reduce each partition with every measure.
    ///
    /// Records with a missing dimension value belong to no group. Missing and
    /// non-numeric values are left out of sums and means.
    pub fn aggregate(
        dataset: &Dataset,
        dimension: &str,
        measures: &[Measure],
    ) -> Result<AggregationResult, AggregateError> {
        let span = info_span!("aggregate", dimension = %dimension);
        let _guard = span.enter();

        let mut required: Vec<&str> = vec![dimension];
        required.extend(measures.iter().filter_map(|m| m.column.as_deref()));
        dataset.require("Aggregation", &required)?;

        let keys = dataset.key_values(dimension)?;
        let columns: Vec<Option<Vec<Option<f64>>>> = measures
            .iter()
            .map(|m| match (m.reducer, &m.column) {
                (Reducer::Count, _) | (_, None) => Ok(None),
                (_, Some(c)) => dataset.numeric_values(c).map(Some),
            })
            .collect::<Result<_, PolarsError>>()?;

        let mut partials: BTreeMap<String, Partial> = BTreeMap::new();
        for (row, key) in keys.into_iter().enumerate() {
            let Some(key) = key else {
                continue;
            };
            let partial = partials.entry(key).or_insert_with(|| Partial {
                records: 0,
                sums: vec![0.0; measures.len()],
                counts: vec![0; measures.len()],
            });
            partial.records += 1;

            for (i, values) in columns.iter().enumerate() {
                if let Some(v) = values.as_ref().and_then(|vals| vals[row]) {
                    partial.sums[i] += v;
                    partial.counts[i] += 1;
                }
            }
        }

        let groups: BTreeMap<String, GroupSummary> = partials
            .into_iter()
            .map(|(key, partial)| {
                let values = measures
                    .iter()
                    .enumerate()
                    .map(|(i, m)| Self::reduce(m.reducer, &partial, i))
                    .collect();
                (
                    key,
                    GroupSummary {
                        records: partial.records,
                        values,
                    },
                )
            })
            .collect();

        debug!(groups = groups.len(), measures = measures.len(), "aggregated");
        Ok(AggregationResult {
            dimension: dimension.to_string(),
            measures: measures.to_vec(),
            groups,
        })
    }

    fn reduce(reducer: Reducer, partial: &Partial, index: usize) -> Option<f64> {
        match reducer {
            Reducer::Count => Some(partial.records as f64),
            Reducer::Sum if partial.counts[index] > 0 => Some(partial.sums[index]),
            Reducer::Mean if partial.counts[index] > 0 => {
                Some(partial.sums[index] / partial.counts[index] as f64)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn suppliers() -> Dataset {
        let df = DataFrame::new(vec![
            Column::new("supplier".into(), vec!["A", "A", "B"]),
            Column::new("qty".into(), vec![10i64, 5, 3]),
        ])
        .unwrap();
        Dataset::from_frame(df)
    }

    #[test]
    fn sums_by_supplier() {
        let result =
            Aggregator::aggregate(&suppliers(), "supplier", &[Measure::sum("qty")]).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.value("A", 0), Some(15.0));
        assert_eq!(result.value("B", 0), Some(3.0));
    }

    #[test]
    fn several_measures_in_one_pass() {
        let measures = [Measure::count(), Measure::mean("qty"), Measure::sum("qty")];
        let result = Aggregator::aggregate(&suppliers(), "supplier", &measures).unwrap();
        let a = result.get("A").unwrap();
        assert_eq!(a.records, 2);
        assert_eq!(a.values, vec![Some(2.0), Some(7.5), Some(15.0)]);
    }

    #[test]
    fn missing_keys_and_values_are_skipped() {
        let df = DataFrame::new(vec![
            Column::new("supplier".into(), vec![Some("A"), None, Some(""), Some("B"), Some("B")]),
            Column::new("price".into(), vec![Some("4"), Some("1"), Some("1"), Some("x"), None]),
        ])
        .unwrap();
        let ds = Dataset::from_frame(df);
        let result =
            Aggregator::aggregate(&ds, "supplier", &[Measure::mean("price"), Measure::sum("price")])
                .unwrap();
        assert_eq!(result.total_records(), 3);
        assert_eq!(result.value("A", 0), Some(4.0));
        // B has records but no numeric value.
        assert_eq!(result.get("B").unwrap().records, 2);
        assert_eq!(result.value("B", 0), None);
        assert_eq!(result.value("B", 1), None);
    }

    #[test]
    fn keys_are_column_values_verbatim() {
        let df = DataFrame::new(vec![
            Column::new("supplier".into(), vec![" A", "A ", "B", " "]),
            Column::new("qty".into(), vec![1i64, 2, 3, 4]),
        ])
        .unwrap();
        let ds = Dataset::from_frame(df);
        let result = Aggregator::aggregate(&ds, "supplier", &[Measure::sum("qty")]).unwrap();

        let keys: Vec<&str> = result.by_key().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec![" A", "A ", "B"]);
        assert!(result.get("A").is_none());
        assert_eq!(result.value(" A", 0), Some(1.0));
        assert_eq!(result.value("A ", 0), Some(2.0));
        assert_eq!(result.total_records(), 3);
    }

    #[test]
    fn date_and_boolean_columns_have_no_sum_or_mean() {
        let df = DataFrame::new(vec![
            Column::new("supplier".into(), vec!["A", "A"]),
            Column::new("shipped".into(), vec![19737i32, 19754])
                .cast(&DataType::Date)
                .unwrap(),
            Column::new("express".into(), vec![true, false]),
        ])
        .unwrap();
        let ds = Dataset::from_frame(df);
        let measures = [
            Measure::sum("shipped"),
            Measure::mean("shipped"),
            Measure::sum("express"),
            Measure::count(),
        ];
        let result = Aggregator::aggregate(&ds, "supplier", &measures).unwrap();
        let a = result.get("A").unwrap();
        assert_eq!(a.records, 2);
        assert_eq!(a.values, vec![None, None, None, Some(2.0)]);
    }

    #[test]
    fn absent_columns_fail_without_result() {
        let err =
            Aggregator::aggregate(&suppliers(), "region", &[Measure::sum("cost")]).unwrap_err();
        match err {
            AggregateError::Schema(e) => {
                assert_eq!(e.missing, vec!["region".to_string(), "cost".to_string()])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn sorting_helpers() {
        let df = DataFrame::new(vec![
            Column::new("k".into(), vec!["b", "a", "c", "d"]),
            Column::new("v".into(), vec![Some(2.0), Some(2.0), Some(9.0), None]),
        ])
        .unwrap();
        let result =
            Aggregator::aggregate(&Dataset::from_frame(df), "k", &[Measure::sum("v")]).unwrap();

        let desc: Vec<&str> = result.sorted_by(0, true).iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(desc, vec!["c", "a", "b", "d"]);
        let asc: Vec<&str> = result.sorted_by(0, false).iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(asc, vec!["a", "b", "c", "d"]);
        let ordered: Vec<&str> = result
            .in_order(&["d", "x", "b"])
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(ordered, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn parses_measures() {
        assert_eq!("count".parse::<Measure>().unwrap(), Measure::count());
        assert_eq!(
            "sum:Revenue generated".parse::<Measure>().unwrap(),
            Measure::sum("Revenue generated")
        );
        assert_eq!("MEAN: Price".parse::<Measure>().unwrap(), Measure::mean("Price"));
        assert!("median:Price".parse::<Measure>().is_err());
        assert!("sum:".parse::<Measure>().is_err());
        assert_eq!(Measure::mean("Price").to_string(), "mean(Price)");
    }
}
