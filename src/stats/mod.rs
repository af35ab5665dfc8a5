//! Statistics module - grouped aggregation and descriptive statistics

mod aggregate;
mod calculator;

pub use aggregate::{
    AggregateError, AggregationResult, Aggregator, GroupSummary, Measure, MeasureParseError,
    Reducer,
};
pub use calculator::{ColumnSummary, Correlation, HistogramBin, StatsCalculator};
