//! Statistics Calculator Module
//! Handles descriptive statistics, quantiles and correlation tests.

use crate::data::Dataset;
use polars::prelude::PolarsResult;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Default for ColumnSummary {
    fn default() -> Self {
        Self {
            column: String::new(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            median: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Pearson correlation between two columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    /// Rows where both values are present.
    pub pairs: usize,
    pub coefficient: Option<f64>,
    /// Two-tailed p-value of the coefficient being zero.
    pub p_value: Option<f64>,
}

/// One equal-width histogram bin. The last bin also holds its upper edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> ColumnSummary {
        let n = values.len();
        if n == 0 {
            return ColumnSummary::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            f64::NAN
        };

        ColumnSummary {
            column: String::new(),
            count: n,
            mean,
            std: variance.sqrt(),
            min: sorted[0],
            p25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            p75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Summaries of every numeric column of a dataset.
    pub fn describe(dataset: &Dataset) -> PolarsResult<Vec<ColumnSummary>> {
        dataset
            .numeric_columns()
            .into_iter()
            .map(|name| {
                let values = dataset.present_numbers(&name)?;
                let mut summary = Self::compute_descriptive_stats(&values);
                summary.column = name;
                Ok(summary)
            })
            .collect()
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    ///
    /// `sorted_values` must be sorted ascending.
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    pub fn median(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(Self::percentile(&sorted, 50.0))
    }

    /// Pearson correlation over the rows where both values are present.
    pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Correlation {
        let pairs: Vec<(f64, f64)> = x
            .iter()
            .zip(y)
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .collect();
        let n = pairs.len();

        let unrelated = Correlation {
            pairs: n,
            coefficient: None,
            p_value: None,
        };
        if n < 2 {
            return unrelated;
        }

        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
        let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
        for (a, b) in &pairs {
            sxy += (a - mean_x) * (b - mean_y);
            sxx += (a - mean_x).powi(2);
            syy += (b - mean_y).powi(2);
        }
        if sxx == 0.0 || syy == 0.0 {
            return unrelated;
        }

        let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
        Correlation {
            pairs: n,
            coefficient: Some(r),
            p_value: Self::correlation_p_value(r, n),
        }
    }

    /// Two-tailed t-test of a correlation coefficient with n - 2 degrees of freedom.
    fn correlation_p_value(r: f64, n: usize) -> Option<f64> {
        if n < 3 {
            return None;
        }
        if (1.0 - r.abs()) < f64::EPSILON {
            return Some(0.0);
        }

        let df = (n - 2) as f64;
        let t = r * (df / (1.0 - r * r)).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df).ok()?;
        Some(2.0 * (1.0 - dist.cdf(t.abs())))
    }

    /// Pairwise correlation coefficients of every numeric column.
    ///
    /// Returns the column names and a row-major square matrix.
    pub fn correlation_matrix(
        dataset: &Dataset,
    ) -> PolarsResult<(Vec<String>, Vec<Vec<Option<f64>>>)> {
        let names = dataset.numeric_columns();
        let columns: Vec<Vec<Option<f64>>> = names
            .iter()
            .map(|name| dataset.numeric_values(name))
            .collect::<PolarsResult<_>>()?;

        let matrix = columns
            .iter()
            .map(|a| {
                columns
                    .iter()
                    .map(|b| Self::pearson(a, b).coefficient)
                    .collect()
            })
            .collect();
        Ok((names, matrix))
    }

    /// Count `values` into `bins` equal-width bins spanning their range.
    ///
    /// A constant column yields a single bin.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        if values.is_empty() || bins == 0 {
            return Vec::new();
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if min == max {
            return vec![HistogramBin {
                lower: min,
                upper: max,
                count: values.len(),
            }];
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for &v in values {
            let index = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[index] += 1;
        }
        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: min + width * i as f64,
                upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
                count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn histogram_spans_the_range() {
        let values = [0.0, 1.0, 2.5, 5.0, 9.0, 10.0];
        let bins = StatsCalculator::histogram(&values, 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![2, 2, 0, 2]);
        assert!(close(bins[0].lower, 0.0));
        assert!(close(bins[1].lower, 2.5));
        assert!(close(bins[3].upper, 10.0));
    }

    #[test]
    fn histogram_edge_cases() {
        assert!(StatsCalculator::histogram(&[], 5).is_empty());
        assert!(StatsCalculator::histogram(&[1.0], 0).is_empty());
        let constant = StatsCalculator::histogram(&[3.0, 3.0, 3.0], 5);
        assert_eq!(constant.len(), 1);
        assert_eq!(constant[0].count, 3);
    }

    #[test]
    fn describes_values() {
        let s = StatsCalculator::compute_descriptive_stats(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(s.count, 4);
        assert!(close(s.mean, 2.5));
        assert!(close(s.min, 1.0));
        assert!(close(s.max, 4.0));
        assert!(close(s.p25, 1.75));
        assert!(close(s.median, 2.5));
        assert!(close(s.p75, 3.25));
        assert!(close(s.std, (5.0f64 / 3.0).sqrt()));
    }

    #[test]
    fn empty_values_give_nan_summary() {
        let s = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan());
    }

    #[test]
    fn percentile_interpolates() {
        let sorted = [10.0, 20.0, 30.0];
        assert!(close(StatsCalculator::percentile(&sorted, 50.0), 20.0));
        assert!(close(StatsCalculator::percentile(&sorted, 25.0), 15.0));
        assert!(close(StatsCalculator::percentile(&[7.0], 90.0), 7.0));
        assert!(StatsCalculator::percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn median_of_unsorted_values() {
        assert_eq!(StatsCalculator::median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(StatsCalculator::median(&[]), None);
    }

    #[test]
    fn perfect_correlation() {
        let x = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let y = [Some(2.0), Some(4.0), Some(6.0), Some(8.0)];
        let c = StatsCalculator::pearson(&x, &y);
        assert_eq!(c.pairs, 4);
        assert!(close(c.coefficient.unwrap(), 1.0));
        assert_eq!(c.p_value, Some(0.0));
    }

    #[test]
    fn correlation_skips_incomplete_pairs() {
        let x = [Some(1.0), None, Some(3.0), Some(2.0), Some(5.0)];
        let y = [Some(1.0), Some(9.0), Some(2.0), None, Some(2.5)];
        let c = StatsCalculator::pearson(&x, &y);
        assert_eq!(c.pairs, 3);
        let r = c.coefficient.unwrap();
        assert!(r > 0.0 && r < 1.0);
        let p = c.p_value.unwrap();
        assert!(p > 0.0 && p <= 1.0);
    }

    #[test]
    fn constant_column_has_no_correlation() {
        let x = [Some(1.0), Some(1.0), Some(1.0)];
        let y = [Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(StatsCalculator::pearson(&x, &y).coefficient, None);
    }
}
