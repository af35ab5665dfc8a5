//! Data overview: shape, a preview of the leading records, column listing,
//! descriptive statistics, missing values and correlations.

use super::{Cell, Metric, ReportError, ReportOptions, ReportTable, Section};
use crate::data::Dataset;
use crate::stats::StatsCalculator;

pub(super) fn build(dataset: &Dataset, options: &ReportOptions) -> Result<Vec<Section>, ReportError> {
    let shape = vec![
        Metric::new("Rows", Cell::count(dataset.len())),
        Metric::new("Columns", Cell::count(dataset.width())),
    ];

    let columns = dataset.columns();
    let mut column_table = ReportTable::new(&["Column", "Kind", "Missing"]);
    for info in &columns {
        column_table.push(vec![
            Cell::text(info.name.as_str()),
            Cell::text(info.kind.as_str()),
            Cell::count(info.missing),
        ]);
    }

    let mut stats_table = ReportTable::new(&[
        "Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max",
    ]);
    for s in StatsCalculator::describe(dataset)? {
        stats_table.push(vec![
            Cell::text(s.column.as_str()),
            Cell::count(s.count),
            Cell::number(Some(s.mean)),
            Cell::number(Some(s.std)),
            Cell::number(Some(s.min)),
            Cell::number(Some(s.p25)),
            Cell::number(Some(s.median)),
            Cell::number(Some(s.p75)),
            Cell::number(Some(s.max)),
        ]);
    }

    let mut missing_table = ReportTable::new(&["Column", "Missing"]);
    for info in columns.iter().filter(|c| c.missing > 0) {
        missing_table.push(vec![Cell::text(info.name.as_str()), Cell::count(info.missing)]);
    }

    let (names, matrix) = StatsCalculator::correlation_matrix(dataset)?;
    let mut headers: Vec<&str> = vec![""];
    headers.extend(names.iter().map(String::as_str));
    let mut correlation_table = ReportTable::new(&headers);
    for (name, row) in names.iter().zip(matrix) {
        let mut cells = vec![Cell::text(name.as_str())];
        cells.extend(row.into_iter().map(Cell::number));
        correlation_table.push(cells);
    }

    Ok(vec![
        Section::metrics("Shape", shape),
        Section::table("Dataset Preview", preview_table(dataset, options.preview_rows)?),
        Section::table("Columns", column_table),
        Section::table("Statistical Summary", stats_table),
        Section::table("Missing Values", missing_table),
        Section::table("Correlations", correlation_table),
    ])
}

/// The first `rows` records, every column.
fn preview_table(dataset: &Dataset, rows: usize) -> Result<ReportTable, ReportError> {
    let names = dataset.column_names();
    let headers: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut table = ReportTable::new(&headers);

    let head = dataset.frame().head(Some(rows));
    for row in 0..head.height() {
        let cells = head
            .get_columns()
            .iter()
            .map(|column| column.get(row).map(Cell::from_any))
            .collect::<Result<Vec<_>, _>>()?;
        table.push(cells);
    }
    Ok(table)
}
