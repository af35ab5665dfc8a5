//! Data module - CSV loading, cleaning, schema and filtering

mod dataset;
pub mod filter;
mod loader;
mod processor;
pub mod schema;

pub use dataset::{ColumnInfo, Dataset, ValueKind};
pub use filter::{ColumnFilter, FilterError, FilterSet};
pub use loader::{DataLoader, LoaderError};
pub use processor::{DataProcessor, SegmentRule, SEGMENT_RULES};
