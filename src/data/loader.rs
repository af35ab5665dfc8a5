//! CSV Data Loader Module
//! Handles CSV loading, cleaning and required-column checks using Polars.

use super::dataset::Dataset;
use super::processor::DataProcessor;
use crate::config::LoaderConfig;
use crate::error::{MalformedInputError, SchemaMismatchError};
use polars::prelude::*;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, info_span};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error(transparent)]
    Malformed(#[from] MalformedInputError),
    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to prepare dataset: {0}")]
    Polars(#[from] PolarsError),
}

/// Loads CSV input into a cleaned [`Dataset`].
#[derive(Debug, Clone, Default)]
pub struct DataLoader {
    config: LoaderConfig,
}

impl DataLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load a CSV file from disk.
    pub fn load_path(&self, path: &Path) -> Result<Dataset, LoaderError> {
        let bytes = std::fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_named(bytes, &path.display().to_string())
    }

    /// Load CSV from any reader.
    pub fn load_reader<R: Read>(&self, mut reader: R) -> Result<Dataset, LoaderError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| LoaderError::Io {
                path: PathBuf::from("<stream>"),
                source,
            })?;
        self.load_named(bytes, "<stream>")
    }

    /// Load CSV from an in-memory byte buffer.
    pub fn load_bytes(&self, bytes: impl Into<Vec<u8>>) -> Result<Dataset, LoaderError> {
        self.load_named(bytes.into(), "<bytes>")
    }

    fn load_named(&self, bytes: Vec<u8>, source: &str) -> Result<Dataset, LoaderError> {
        let span = info_span!("load", source = %source);
        let _guard = span.enter();
        let started = Instant::now();

        let df = self.parse(bytes)?;
        debug!(rows = df.height(), columns = df.width(), "parsed CSV");

        let df = DataProcessor::clean(df, &self.config)?;
        let dataset = Dataset::from_frame(df);

        let required: Vec<&str> = self
            .config
            .required_columns
            .iter()
            .map(String::as_str)
            .collect();
        dataset.require("Dataset", &required)?;

        info!(
            rows = dataset.len(),
            columns = dataset.width(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Parse delimited text into a DataFrame.
    fn parse(&self, bytes: Vec<u8>) -> Result<DataFrame, MalformedInputError> {
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| MalformedInputError::new(format!("input is not valid UTF-8: {e}")))?;
        if text.trim().is_empty() {
            return Err(MalformedInputError::new("input is empty"));
        }

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.config.infer_schema_length))
            .map_parse_options(|opts| opts.with_try_parse_dates(true))
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .map_err(|e| MalformedInputError::new(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ValueKind;

    fn lenient() -> DataLoader {
        DataLoader::new(LoaderConfig {
            required_columns: Vec::new(),
            ..LoaderConfig::default()
        })
    }

    #[test]
    fn loads_every_data_row() {
        let ds = lenient()
            .load_bytes("supplier,qty\nA,10\nA,5\nB,3\n")
            .unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column_names(), vec!["supplier", "qty"]);
    }

    #[test]
    fn header_only_is_an_empty_dataset() {
        let ds = lenient().load_bytes("supplier,qty\n").unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.width(), 2);
    }

    #[test]
    fn empty_input_is_malformed() {
        let err = lenient().load_bytes("").unwrap_err();
        assert!(matches!(err, LoaderError::Malformed(_)));
        let err = lenient().load_bytes("  \n").unwrap_err();
        assert!(matches!(err, LoaderError::Malformed(_)));
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let err = lenient().load_bytes(vec![b'a', b',', 0xff, b'\n']).unwrap_err();
        assert!(matches!(err, LoaderError::Malformed(_)));
    }

    #[test]
    fn extra_fields_are_malformed() {
        let err = lenient().load_bytes("a,b\n1,2\n3,4,5,6\n").unwrap_err();
        assert!(matches!(err, LoaderError::Malformed(_)));
    }

    #[test]
    fn missing_required_columns_fail() {
        let err = DataLoader::default()
            .load_bytes("Price,Revenue generated\n1.0,2.0\n")
            .unwrap_err();
        match err {
            LoaderError::Schema(e) => {
                assert_eq!(
                    e.missing,
                    vec!["Shipping costs".to_string(), "Defect rates".to_string()]
                );
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn parses_dates() {
        let ds = lenient()
            .load_bytes("shipped,qty\n2024-01-15,1\n2024-02-01,2\n")
            .unwrap();
        assert_eq!(ds.columns()[0].kind, ValueKind::Date);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = lenient()
            .load_path(Path::new("/nonexistent/data.csv"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }
}
