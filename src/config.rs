//! Configuration Module
//! Optional TOML settings for the loader and the report pages.

use crate::data::schema;
use crate::reports::ReportOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "supply_insight.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub loader: LoaderConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Dataset used when no `--data` path is given.
    pub default_dataset: PathBuf,
    /// Rows scanned to infer column types.
    pub infer_schema_length: usize,
    /// Columns that must be present after cleaning.
    pub required_columns: Vec<String>,
    /// Source column name -> dataset column name.
    pub renames: BTreeMap<String, String>,
    /// Column -> text used for missing cells.
    pub fill_missing: BTreeMap<String, String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        let renames = [
            ("Costs", schema::TRANSPORTATION_COSTS),
            ("Lead times", "Supplier_lead_time"),
        ];
        let fill_missing = [
            (schema::SHIPPING_CARRIERS, "Unknown"),
            (schema::CUSTOMER_DEMOGRAPHICS, "Unknown"),
        ];

        Self {
            default_dataset: PathBuf::from("supply_chain_data.csv"),
            infer_schema_length: 10_000,
            required_columns: schema::BASE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            renames: renames
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fill_missing: fill_missing
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Rows shown in "top N" tables.
    pub top_n: usize,
    /// Leading records shown in the dataset preview.
    pub preview_rows: usize,
    /// Bins in the price histogram.
    pub histogram_bins: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let options = ReportOptions::default();
        Self {
            top_n: options.top_n,
            preview_rows: options.preview_rows,
            histogram_bins: options.histogram_bins,
        }
    }
}

impl ReportConfig {
    pub fn options(&self) -> ReportOptions {
        ReportOptions {
            top_n: self.top_n,
            preview_rows: self.preview_rows,
            histogram_bins: self.histogram_bins,
        }
    }
}

impl Config {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
