//! Error taxonomy shared by the loader, aggregation layer and report pages.

use thiserror::Error;

/// The input could not be parsed as delimited tabular text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed CSV input: {reason}")]
pub struct MalformedInputError {
    pub reason: String,
}

impl MalformedInputError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Columns required by an analysis are absent from the dataset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{context}: dataset is missing required column(s): {}", .missing.join(", "))]
pub struct SchemaMismatchError {
    /// What needed the columns (a page title, "aggregation", ...).
    pub context: String,
    pub missing: Vec<String>,
}

impl SchemaMismatchError {
    pub fn new(context: impl Into<String>, missing: Vec<String>) -> Self {
        Self {
            context: context.into(),
            missing,
        }
    }
}
