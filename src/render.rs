//! Terminal and JSON presentation of reports, aggregations and column listings.

use crate::data::ColumnInfo;
use crate::reports::{Cell, Content, Metric, Report, ReportTable};
use crate::stats::{AggregationResult, GroupSummary};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, CellAlignment, ContentArrangement, Table};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown format '{other}' (expected table or json)")),
        }
    }
}

/// Render a report page.
pub fn render_report(report: &Report, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report),
        OutputFormat::Table => {
            let mut out = format!("{} ({} records)\n", report.title, report.records);
            for section in &report.sections {
                let table = match &section.content {
                    Content::Metrics(metrics) => metric_table(metrics),
                    Content::Table(table) => report_table(table),
                };
                out.push_str(&format!("\n{}\n{table}\n", section.title));
            }
            Ok(out)
        }
    }
}

#[derive(Serialize)]
struct GroupRow<'a> {
    key: &'a str,
    records: usize,
    values: &'a [Option<f64>],
}

#[derive(Serialize)]
struct AggregationView<'a> {
    dimension: &'a str,
    measures: Vec<String>,
    groups: Vec<GroupRow<'a>>,
}

/// Render an aggregation with its groups in the given order.
pub fn render_aggregation(
    result: &AggregationResult,
    groups: &[(&String, &GroupSummary)],
    format: OutputFormat,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => {
            let view = AggregationView {
                dimension: &result.dimension,
                measures: result.measures.iter().map(|m| m.label()).collect(),
                groups: groups
                    .iter()
                    .map(|(key, summary)| GroupRow {
                        key: key.as_str(),
                        records: summary.records,
                        values: &summary.values,
                    })
                    .collect(),
            };
            serde_json::to_string_pretty(&view)
        }
        OutputFormat::Table => {
            let labels: Vec<String> = result.measures.iter().map(|m| m.label()).collect();
            let mut headers: Vec<&str> = vec![result.dimension.as_str()];
            headers.extend(labels.iter().map(String::as_str));
            let table = ReportTable::from_groups(&headers, result, groups);
            Ok(format!("{}\n", report_table(&table)))
        }
    }
}

/// Render the column listing of a dataset.
pub fn render_columns(columns: &[ColumnInfo], format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(columns),
        OutputFormat::Table => {
            let mut table = ReportTable::new(&["Column", "Kind", "Missing"]);
            for info in columns {
                table.push(vec![
                    Cell::text(info.name.as_str()),
                    Cell::text(info.kind.as_str()),
                    Cell::count(info.missing),
                ]);
            }
            Ok(format!("{}\n", report_table(&table)))
        }
    }
}

fn styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> comfy_table::Cell {
    comfy_table::Cell::new(text).add_attribute(Attribute::Bold)
}

fn value_cell(cell: &Cell) -> comfy_table::Cell {
    let rendered = comfy_table::Cell::new(cell.to_string());
    if cell.is_numeric() {
        rendered.set_alignment(CellAlignment::Right)
    } else {
        rendered
    }
}

fn report_table(source: &ReportTable) -> Table {
    let mut table = styled_table();
    table.set_header(source.headers.iter().map(|h| header_cell(h)).collect::<Vec<_>>());
    for row in &source.rows {
        table.add_row(row.iter().map(value_cell).collect::<Vec<_>>());
    }
    table
}

fn metric_table(metrics: &[Metric]) -> Table {
    let mut table = styled_table();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    for metric in metrics {
        table.add_row(vec![
            comfy_table::Cell::new(&metric.label),
            value_cell(&metric.value),
        ]);
    }
    table
}
