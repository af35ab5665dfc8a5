//! Supply Insight - supply chain CSV analytics
//!
//! Loads a supply chain dataset from CSV, cleans it, and computes the grouped
//! aggregations and statistics behind a set of report pages.

pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod reports;
pub mod session;
pub mod stats;

pub use config::Config;
pub use data::{DataLoader, Dataset};
pub use error::{MalformedInputError, SchemaMismatchError};
pub use reports::{build_report, Page, Report, ReportOptions};
pub use stats::{AggregationResult, Aggregator, Measure, Reducer};
