//! Row filters applied between loading and aggregation.

use super::dataset::Dataset;
use crate::error::SchemaMismatchError;
use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("invalid filter '{0}': expected COLUMN=VALUE[,VALUE...]")]
    Syntax(String),
}

/// Keep records whose value in `column` is one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnFilter {
    pub column: String,
    pub values: BTreeSet<String>,
}

impl FromStr for ColumnFilter {
    type Err = FilterError;

    /// Parse `COLUMN=VALUE[,VALUE...]`. Whitespace around names and values is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, values) = s
            .split_once('=')
            .ok_or_else(|| FilterError::Syntax(s.to_string()))?;
        let column = column.trim();
        let values: BTreeSet<String> = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();

        if column.is_empty() || values.is_empty() {
            return Err(FilterError::Syntax(s.to_string()));
        }
        Ok(Self {
            column: column.to_string(),
            values,
        })
    }
}

/// Conjunction of column filters: column name -> selected values.
///
/// An empty set keeps every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSet {
    filters: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection for the filter's column.
    pub fn set(&mut self, filter: ColumnFilter) {
        self.filters.insert(filter.column, filter.values);
    }

    /// Drop the filter on `column`. Returns whether one existed.
    pub fn remove(&mut self, column: &str) -> bool {
        self.filters.remove(column).is_some()
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.filters.iter()
    }

    /// Build a new dataset holding only the records that pass every filter.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset, FilterError> {
        if self.filters.is_empty() {
            return Ok(dataset.clone());
        }

        let columns: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        dataset.require("Filter", &columns)?;

        let mut keep = vec![true; dataset.len()];
        for (column, selected) in &self.filters {
            let cells = dataset.text_values(column)?;
            for (k, cell) in keep.iter_mut().zip(cells) {
                *k = *k && cell.is_some_and(|c| selected.contains(&c));
            }
        }

        let mask = BooleanChunked::from_slice("mask".into(), &keep);
        let df = dataset.frame().filter(&mask)?;
        Ok(Dataset::from_frame(df))
    }
}

impl FromIterator<ColumnFilter> for FilterSet {
    fn from_iter<I: IntoIterator<Item = ColumnFilter>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        for filter in iter {
            set.set(filter);
        }
        set
    }
}
