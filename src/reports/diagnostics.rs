//! Diagnostic analytics: lead time against stock levels and against defect rates.

use super::{Cell, Metric, ReportError, Section};
use crate::data::schema::{DEFECT_RATES, LEAD_TIME, STOCK_LEVELS};
use crate::data::Dataset;
use crate::stats::StatsCalculator;

pub(super) fn build(dataset: &Dataset) -> Result<Vec<Section>, ReportError> {
    Ok(vec![
        relationship(dataset, "Stock Levels vs Lead Time", LEAD_TIME, STOCK_LEVELS)?,
        relationship(dataset, "Lead Time vs Defect Rates", LEAD_TIME, DEFECT_RATES)?,
    ])
}

fn relationship(dataset: &Dataset, title: &str, x: &str, y: &str) -> Result<Section, ReportError> {
    let xs = dataset.numeric_values(x)?;
    let ys = dataset.numeric_values(y)?;
    let correlation = StatsCalculator::pearson(&xs, &ys);

    let median = |values: &[Option<f64>]| {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        StatsCalculator::median(&present)
    };

    Ok(Section::metrics(
        title,
        vec![
            Metric::new("Correlation", Cell::number(correlation.coefficient)),
            Metric::new("p-value", Cell::number(correlation.p_value)),
            Metric::new("Pairs", Cell::count(correlation.pairs)),
            Metric::new(format!("Median {x}"), Cell::number(median(&xs))),
            Metric::new(format!("Median {y}"), Cell::number(median(&ys))),
        ],
    ))
}
