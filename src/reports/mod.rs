//! Report pages - the tables and metrics behind each dashboard page

mod customer;
mod diagnostics;
mod executive;
mod logistics;
mod overview;
mod product;
mod supplier;

use crate::data::schema::required_columns;
use crate::data::Dataset;
use crate::error::SchemaMismatchError;
use crate::stats::{AggregateError, AggregationResult, GroupSummary, Reducer};
use polars::prelude::{AnyValue, PolarsError};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info_span};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl ReportError {
    /// The missing-column error behind this failure, if any.
    pub fn schema_mismatch(&self) -> Option<&SchemaMismatchError> {
        match self {
            ReportError::Schema(e) | ReportError::Aggregate(AggregateError::Schema(e)) => Some(e),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown page '{0}' (expected one of: executive, overview, product, customer, supplier, logistics, diagnostics)")]
pub struct PageParseError(String);

/// A report page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Executive,
    Overview,
    Product,
    Customer,
    Supplier,
    Logistics,
    Diagnostics,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Executive,
        Page::Overview,
        Page::Product,
        Page::Customer,
        Page::Supplier,
        Page::Logistics,
        Page::Diagnostics,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Executive => "Executive Summary",
            Page::Overview => "Data Overview",
            Page::Product => "Product Analysis",
            Page::Customer => "Customer Segmentation",
            Page::Supplier => "Supplier Analysis",
            Page::Logistics => "Logistics Analysis",
            Page::Diagnostics => "Diagnostic Analytics",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Page::Executive => "executive",
            Page::Overview => "overview",
            Page::Product => "product",
            Page::Customer => "customer",
            Page::Supplier => "supplier",
            Page::Logistics => "logistics",
            Page::Diagnostics => "diagnostics",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Page {
    type Err = PageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "executive" | "summary" => Ok(Page::Executive),
            "overview" | "data" => Ok(Page::Overview),
            "product" | "products" => Ok(Page::Product),
            "customer" | "customers" => Ok(Page::Customer),
            "supplier" | "suppliers" => Ok(Page::Supplier),
            "logistics" => Ok(Page::Logistics),
            "diagnostics" | "diagnostic" => Ok(Page::Diagnostics),
            _ => Err(PageParseError(s.to_string())),
        }
    }
}

/// One table or metric cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Number(f64),
    Missing,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn count(n: usize) -> Self {
        Cell::Integer(i64::try_from(n).unwrap_or(i64::MAX))
    }

    pub fn number(v: Option<f64>) -> Self {
        match v {
            Some(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Missing,
        }
    }

    /// A cell for one polars value, integers kept exact.
    pub fn from_any(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Cell::Missing,
            AnyValue::Int8(v) => Cell::Integer(i64::from(v)),
            AnyValue::Int16(v) => Cell::Integer(i64::from(v)),
            AnyValue::Int32(v) => Cell::Integer(i64::from(v)),
            AnyValue::Int64(v) => Cell::Integer(v),
            AnyValue::UInt8(v) => Cell::Integer(i64::from(v)),
            AnyValue::UInt16(v) => Cell::Integer(i64::from(v)),
            AnyValue::UInt32(v) => Cell::Integer(i64::from(v)),
            AnyValue::UInt64(v) => i64::try_from(v).map_or(Cell::Number(v as f64), Cell::Integer),
            AnyValue::Float32(v) => Cell::number(Some(f64::from(v))),
            AnyValue::Float64(v) => Cell::number(Some(v)),
            AnyValue::String(s) => Cell::text(s),
            AnyValue::StringOwned(s) => Cell::text(s.as_str()),
            other => Cell::text(other.to_string()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Integer(_) | Cell::Number(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Number(v) if v.abs() >= 1.0e-3 || *v == 0.0 => write!(f, "{v:.2}"),
            Cell::Number(v) => write!(f, "{v:.4e}"),
            Cell::Missing => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: Cell,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: Cell) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// One row per group: the key, then one cell per measure.
    ///
    /// `headers` names the key column followed by each measure.
    pub fn from_groups(
        headers: &[&str],
        result: &AggregationResult,
        groups: &[(&String, &GroupSummary)],
    ) -> Self {
        let mut table = Self::new(headers);
        for (key, summary) in groups {
            let mut row = vec![Cell::text(key.as_str())];
            row.extend(result.measures.iter().enumerate().map(|(i, m)| {
                match m.reducer {
                    Reducer::Count => Cell::count(summary.records),
                    _ => Cell::number(summary.values.get(i).copied().flatten()),
                }
            }));
            table.push(row);
        }
        table
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Content {
    Metrics(Vec<Metric>),
    Table(ReportTable),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub content: Content,
}

impl Section {
    pub fn metrics(title: impl Into<String>, metrics: Vec<Metric>) -> Self {
        Self {
            title: title.into(),
            content: Content::Metrics(metrics),
        }
    }

    pub fn table(title: impl Into<String>, table: ReportTable) -> Self {
        Self {
            title: title.into(),
            content: Content::Table(table),
        }
    }
}

/// A rendered page: titled sections of metrics and tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub page: Page,
    pub title: String,
    pub records: usize,
    pub sections: Vec<Section>,
}

impl Report {
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    pub fn table(&self, title: &str) -> Option<&ReportTable> {
        match self.section(title).map(|s| &s.content) {
            Some(Content::Table(t)) => Some(t),
            _ => None,
        }
    }

    pub fn metric(&self, section: &str, label: &str) -> Option<&Cell> {
        match self.section(section).map(|s| &s.content) {
            Some(Content::Metrics(m)) => m.iter().find(|m| m.label == label).map(|m| &m.value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Rows in "top N" tables.
    pub top_n: usize,
    /// Leading records shown in the dataset preview.
    pub preview_rows: usize,
    /// Equal-width bins in the price histogram.
    pub histogram_bins: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            preview_rows: 50,
            histogram_bins: 10,
        }
    }
}

/// Build one page from the dataset.
///
/// Fails with a schema mismatch, before computing anything, when the
/// dataset lacks a column the page reads.
pub fn build_report(
    page: Page,
    dataset: &Dataset,
    options: &ReportOptions,
) -> Result<Report, ReportError> {
    let span = info_span!("report", page = %page);
    let _guard = span.enter();
    let started = Instant::now();

    dataset.require(page.title(), required_columns(page))?;

    let sections = match page {
        Page::Executive => executive::build(dataset)?,
        Page::Overview => overview::build(dataset, options)?,
        Page::Product => product::build(dataset, options)?,
        Page::Customer => customer::build(dataset)?,
        Page::Supplier => supplier::build(dataset)?,
        Page::Logistics => logistics::build(dataset)?,
        Page::Diagnostics => diagnostics::build(dataset)?,
    };

    debug!(
        sections = sections.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "report built"
    );
    Ok(Report {
        page,
        title: page.title().to_string(),
        records: dataset.len(),
        sections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_page_names() {
        for page in Page::ALL {
            assert_eq!(page.slug().parse::<Page>().unwrap(), page);
        }
        assert_eq!("Suppliers".parse::<Page>().unwrap(), Page::Supplier);
        assert!("home".parse::<Page>().is_err());
    }

    #[test]
    fn formats_cells() {
        assert_eq!(Cell::Number(1234.5).to_string(), "1234.50");
        assert_eq!(Cell::Number(0.0).to_string(), "0.00");
        assert_eq!(Cell::Number(0.00012).to_string(), "1.2000e-4");
        assert_eq!(Cell::count(7).to_string(), "7");
        assert_eq!(Cell::number(None), Cell::Missing);
        assert_eq!(Cell::number(Some(f64::NAN)), Cell::Missing);
    }

    #[test]
    fn cells_from_polars_values() {
        assert_eq!(Cell::from_any(AnyValue::Int64(120)), Cell::Integer(120));
        assert_eq!(Cell::from_any(AnyValue::UInt32(7)), Cell::Integer(7));
        assert_eq!(Cell::from_any(AnyValue::Float64(2.5)), Cell::Number(2.5));
        assert_eq!(Cell::from_any(AnyValue::String("Air")), Cell::text("Air"));
        assert_eq!(Cell::from_any(AnyValue::Null), Cell::Missing);
        assert_eq!(Cell::from_any(AnyValue::Boolean(true)), Cell::text("true"));
    }

    #[test]
    fn cells_serialize_as_plain_json() {
        let row = vec![Cell::text("A"), Cell::count(2), Cell::Number(1.5), Cell::Missing];
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"["A",2,1.5,null]"#);
    }
}
