//! Data Processor Module
//! Cleans a freshly parsed table and derives the quantile segment columns.

use super::dataset::Dataset;
use super::schema;
use crate::config::LoaderConfig;
use crate::stats::StatsCalculator;
use polars::prelude::*;
use tracing::{debug, warn};

/// Quantile segmentation of a numeric column into three labels.
///
/// Edges are `[0, q25, q75, max]` with right-closed intervals.
#[derive(Debug, Clone, Copy)]
pub struct SegmentRule {
    pub source: &'static str,
    pub target: &'static str,
    pub labels: [&'static str; 3],
    /// Whether the lowest edge (0) belongs to the first interval.
    pub include_lowest: bool,
}

pub const SEGMENT_RULES: [SegmentRule; 3] = [
    SegmentRule {
        source: schema::PRICE,
        target: schema::PRICE_SEGMENT,
        labels: schema::PRICE_SEGMENT_LABELS,
        include_lowest: false,
    },
    SegmentRule {
        source: schema::REVENUE,
        target: schema::REVENUE_CLUSTER,
        labels: schema::REVENUE_CLUSTER_LABELS,
        include_lowest: true,
    },
    SegmentRule {
        source: schema::DEFECT_RATES,
        target: schema::DEFECT_CLUSTER,
        labels: schema::DEFECT_CLUSTER_LABELS,
        include_lowest: true,
    },
];

/// Columns coerced to floats after loading.
const FLOAT_COLUMNS: [&str; 3] = [schema::PRICE, schema::REVENUE, schema::SHIPPING_COSTS];

/// Handles data cleaning and feature derivation.
pub struct DataProcessor;

impl DataProcessor {
    /// Run every cleaning step in order.
    pub fn clean(df: DataFrame, config: &LoaderConfig) -> PolarsResult<DataFrame> {
        let df = Self::drop_duplicated_columns(df)?;
        let df = Self::rename_columns(df, config)?;
        let df = Self::fill_and_coerce(df, config)?;
        Self::add_segments(df)
    }

    /// Drop the `<name>_duplicated_<n>` copies Polars creates for repeated headers.
    pub fn drop_duplicated_columns(df: DataFrame) -> PolarsResult<DataFrame> {
        let names = column_names(&df);
        let duplicated: Vec<&String> = names
            .iter()
            .filter(|name| {
                name.rsplit_once("_duplicated_").is_some_and(|(base, idx)| {
                    idx.parse::<usize>().is_ok() && names.iter().any(|n| n == base)
                })
            })
            .collect();

        let mut df = df;
        for name in duplicated {
            debug!(column = %name, "dropping duplicated column");
            df = df.drop(name)?;
        }
        Ok(df)
    }

    pub fn rename_columns(mut df: DataFrame, config: &LoaderConfig) -> PolarsResult<DataFrame> {
        for (from, to) in &config.renames {
            if df.column(from).is_err() {
                continue;
            }
            if df.column(to).is_ok() {
                warn!(from = %from, to = %to, "rename target already exists, keeping source name");
                continue;
            }
            df.rename(from, to.as_str().into())?;
        }
        Ok(df)
    }

    /// Fill missing text and coerce the money columns to floats.
    pub fn fill_and_coerce(df: DataFrame, config: &LoaderConfig) -> PolarsResult<DataFrame> {
        let mut exprs: Vec<Expr> = Vec::new();

        for (name, fill) in &config.fill_missing {
            if df.column(name).is_ok() {
                exprs.push(
                    col(name.as_str())
                        .cast(DataType::String)
                        .fill_null(lit(fill.clone())),
                );
            }
        }

        for name in FLOAT_COLUMNS {
            if df.column(name).is_ok() {
                exprs.push(col(name).cast(DataType::Float64));
            }
        }

        if exprs.is_empty() {
            return Ok(df);
        }
        df.lazy().with_columns(exprs).collect()
    }

    /// Append the segment column of every rule whose source column is present.
    pub fn add_segments(df: DataFrame) -> PolarsResult<DataFrame> {
        let dataset = Dataset::from_frame(df);
        let mut derived: Vec<Column> = Vec::new();

        for rule in &SEGMENT_RULES {
            if !dataset.has_column(rule.source) {
                continue;
            }
            let values = dataset.numeric_values(rule.source)?;
            match Self::segment(&values, rule) {
                Some(labels) => derived.push(Column::new(rule.target.into(), labels)),
                None => debug!(column = rule.source, "no numeric values, skipping segment"),
            }
        }

        let mut df = dataset.into_frame();
        for column in derived {
            df.with_column(column)?;
        }
        Ok(df)
    }

    /// Label every value with its quantile interval.
    ///
    /// Returns `None` when the column has no numeric value at all.
    pub fn segment(values: &[Option<f64>], rule: &SegmentRule) -> Option<Vec<Option<&'static str>>> {
        let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q25 = StatsCalculator::percentile(&sorted, 25.0);
        let q75 = StatsCalculator::percentile(&sorted, 75.0);
        let max = sorted[sorted.len() - 1];
        let edges = [0.0, q25, q75, max];

        Some(
            values
                .iter()
                .map(|v| v.and_then(|v| Self::bucket(v, &edges, rule)))
                .collect(),
        )
    }

    fn bucket(value: f64, edges: &[f64; 4], rule: &SegmentRule) -> Option<&'static str> {
        (0..3)
            .find(|&i| {
                let (lo, hi) = (edges[i], edges[i + 1]);
                let above_lo = value > lo || (i == 0 && rule.include_lowest && value == lo);
                above_lo && value <= hi
            })
            .map(|i| rule.labels[i])
    }
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: Vec<Column>) -> DataFrame {
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn drops_polars_duplicate_labels() {
        let df = frame(vec![
            Column::new("SKU".into(), vec!["a", "b"]),
            Column::new("SKU_duplicated_0".into(), vec!["a", "b"]),
            Column::new("odd_duplicated_x".into(), vec!["a", "b"]),
        ]);
        let df = DataProcessor::drop_duplicated_columns(df).unwrap();
        assert_eq!(column_names(&df), vec!["SKU", "odd_duplicated_x"]);
    }

    #[test]
    fn renames_configured_columns() {
        let df = frame(vec![
            Column::new("Costs".into(), vec![1.0, 2.0]),
            Column::new("Lead times".into(), vec![3i64, 4]),
        ]);
        let df = DataProcessor::rename_columns(df, &LoaderConfig::default()).unwrap();
        assert_eq!(
            column_names(&df),
            vec!["Transportation_costs", "Supplier_lead_time"]
        );
    }

    #[test]
    fn fills_missing_carriers_and_coerces_prices() {
        let df = frame(vec![
            Column::new("Shipping carriers".into(), vec![Some("Carrier A"), None]),
            Column::new("Price".into(), vec![Some("12.5"), Some("n/a")]),
        ]);
        let df = DataProcessor::fill_and_coerce(df, &LoaderConfig::default()).unwrap();
        let ds = Dataset::from_frame(df);
        assert_eq!(
            ds.text_values("Shipping carriers").unwrap(),
            vec![Some("Carrier A".to_string()), Some("Unknown".to_string())]
        );
        assert_eq!(ds.numeric_values("Price").unwrap(), vec![Some(12.5), None]);
    }

    #[test]
    fn segments_by_quartiles() {
        let rule = SEGMENT_RULES[1];
        // q25 = 2.0, q75 = 4.0, max = 5.0
        let values = [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), None];
        let labels = DataProcessor::segment(&values, &rule).unwrap();
        assert_eq!(
            labels,
            vec![
                Some("Low Value Cluster"),
                Some("Low Value Cluster"),
                Some("Medium Value Cluster"),
                Some("Medium Value Cluster"),
                Some("High Value Cluster"),
                None,
            ]
        );
    }

    #[test]
    fn lowest_edge_follows_rule() {
        let values = [Some(0.0), Some(2.0), Some(4.0), Some(6.0), Some(8.0)];
        let price = DataProcessor::segment(&values, &SEGMENT_RULES[0]).unwrap();
        assert_eq!(price[0], None);
        let revenue = DataProcessor::segment(&values, &SEGMENT_RULES[1]).unwrap();
        assert_eq!(revenue[0], Some("Low Value Cluster"));
    }

    #[test]
    fn constant_column_lands_in_first_segment() {
        // q25 = q75 = max = 5.0, so the upper two intervals have zero width.
        let values = [Some(5.0); 4];
        let labels = DataProcessor::segment(&values, &SEGMENT_RULES[1]).unwrap();
        assert_eq!(labels, vec![Some("Low Value Cluster"); 4]);
    }

    #[test]
    fn zero_width_middle_interval_never_matches() {
        // q25 = q75 = 1.0, max = 9.0
        let values = [Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(9.0)];
        let labels = DataProcessor::segment(&values, &SEGMENT_RULES[1]).unwrap();
        assert_eq!(
            labels,
            vec![
                Some("Low Value Cluster"),
                Some("Low Value Cluster"),
                Some("Low Value Cluster"),
                Some("Low Value Cluster"),
                Some("High Value Cluster"),
            ]
        );
        assert!(!labels.contains(&Some("Medium Value Cluster")));
    }

    #[test]
    fn values_below_zero_get_no_segment() {
        // q25 = 1.0, q75 = 3.0, max = 4.0
        let values = [Some(-2.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0), None];
        for rule in &SEGMENT_RULES {
            let labels = DataProcessor::segment(&values, rule).unwrap();
            assert_eq!(labels[0], None, "{}", rule.target);
            assert_eq!(labels[1], Some(rule.labels[0]));
            assert_eq!(labels[2], Some(rule.labels[1]));
            assert_eq!(labels[3], Some(rule.labels[1]));
            assert_eq!(labels[4], Some(rule.labels[2]));
            assert_eq!(labels[5], None);
        }
    }

    #[test]
    fn no_numeric_values_means_no_segment() {
        assert!(DataProcessor::segment(&[None, None], &SEGMENT_RULES[0]).is_none());
    }

    #[test]
    fn clean_adds_segment_columns() {
        let df = frame(vec![
            Column::new("Price".into(), vec![10.0, 20.0, 30.0, 40.0]),
            Column::new("Revenue generated".into(), vec![100.0, 200.0, 300.0, 400.0]),
        ]);
        let df = DataProcessor::clean(df, &LoaderConfig::default()).unwrap();
        let ds = Dataset::from_frame(df);
        assert!(ds.has_column(schema::PRICE_SEGMENT));
        assert!(ds.has_column(schema::REVENUE_CLUSTER));
        assert!(!ds.has_column(schema::DEFECT_CLUSTER));
    }
}
