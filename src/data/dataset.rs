//! Dataset Module
//! The in-memory table every report reads from, with typed column access.

use crate::error::SchemaMismatchError;
use polars::prelude::*;
use serde::Serialize;

/// Value type of a dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Number,
    Date,
    Other,
}

impl ValueKind {
    pub fn of(dtype: &DataType) -> Self {
        match dtype {
            DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => ValueKind::Number,
            DataType::String | DataType::Categorical(..) | DataType::Enum(..) => ValueKind::Text,
            DataType::Date | DataType::Datetime(..) => ValueKind::Date,
            _ => ValueKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Number => "number",
            ValueKind::Date => "date",
            ValueKind::Other => "other",
        }
    }
}

/// Name, kind and missing count of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ValueKind,
    pub missing: usize,
}

/// An ordered sequence of records loaded from CSV.
///
/// A dataset is never mutated after loading; filtering produces a new one.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    df: DataFrame,
}

impl Dataset {
    pub fn from_frame(df: DataFrame) -> Self {
        Self { df }
    }

    /// Get a reference to the underlying DataFrame.
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_frame(self) -> DataFrame {
        self.df
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.df.width()
    }

    /// Column names in file order.
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    /// Describe every column.
    pub fn columns(&self) -> Vec<ColumnInfo> {
        self.df
            .get_columns()
            .iter()
            .map(|col| ColumnInfo {
                name: col.name().to_string(),
                kind: ValueKind::of(col.dtype()),
                missing: col.null_count(),
            })
            .collect()
    }

    /// Names of the numeric columns.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|col| ValueKind::of(col.dtype()) == ValueKind::Number)
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Fail with the list of `columns` that are absent.
    pub fn require(&self, context: &str, columns: &[&str]) -> Result<(), SchemaMismatchError> {
        let missing: Vec<String> = columns
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaMismatchError::new(context, missing))
        }
    }

    /// Column values as floats. Cells that are missing, non-numeric or NaN
    /// come back as `None`.
    ///
    /// Number columns are read as-is and text cells are parsed. Date, boolean
    /// and other columns hold no numbers, so every cell is `None`.
    pub fn numeric_values(&self, name: &str) -> PolarsResult<Vec<Option<f64>>> {
        let column = self.df.column(name)?;
        let casted = match ValueKind::of(column.dtype()) {
            ValueKind::Number => column.cast(&DataType::Float64)?,
            ValueKind::Text => column.cast(&DataType::String)?.cast(&DataType::Float64)?,
            ValueKind::Date | ValueKind::Other => return Ok(vec![None; column.len()]),
        };
        let values = casted.f64()?;
        Ok(values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    /// Column values rendered as text. Missing and blank cells come back as `None`.
    pub fn text_values(&self, name: &str) -> PolarsResult<Vec<Option<String>>> {
        let casted = self.df.column(name)?.cast(&DataType::String)?;
        let values = casted.str()?;
        Ok(values
            .into_iter()
            .map(|v| {
                v.map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
            })
            .collect())
    }

    /// Column values as grouping keys, exactly as they appear in the column.
    ///
    /// Missing, empty and whitespace-only cells come back as `None`; every
    /// other cell keeps its original text, padding included.
    pub fn key_values(&self, name: &str) -> PolarsResult<Vec<Option<String>>> {
        let casted = self.df.column(name)?.cast(&DataType::String)?;
        let values = casted.str()?;
        Ok(values
            .into_iter()
            .map(|v| v.filter(|s| !s.trim().is_empty()).map(str::to_string))
            .collect())
    }

    /// Numeric values with the missing ones dropped.
    pub fn present_numbers(&self, name: &str) -> PolarsResult<Vec<f64>> {
        Ok(self.numeric_values(name)?.into_iter().flatten().collect())
    }
}
