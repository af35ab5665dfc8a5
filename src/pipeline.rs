//! Pipeline Module
//! The stages a command runs: resolve the input, load and filter it, then
//! order aggregation groups for output.

use crate::data::{DataLoader, Dataset, FilterError, FilterSet, LoaderError};
use crate::stats::{AggregationResult, GroupSummary};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to load {input}")]
    Load {
        input: String,
        #[source]
        source: LoaderError,
    },
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("sort index {index} is out of range ({measures} measure(s) given)")]
    SortOutOfRange { index: usize, measures: usize },
}

/// Where the CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Stdin,
    File(PathBuf),
}

impl DataSource {
    /// `-` names stdin. Without a path the configured default is used.
    pub fn resolve(data: Option<&Path>, default: &Path) -> Self {
        match data {
            Some(path) if path.as_os_str() == "-" => DataSource::Stdin,
            Some(path) => DataSource::File(path.to_path_buf()),
            None => DataSource::File(default.to_path_buf()),
        }
    }

    /// Load the dataset, reading `stdin` only for [`DataSource::Stdin`].
    pub fn load<R: Read>(&self, loader: &DataLoader, stdin: R) -> Result<Dataset, PipelineError> {
        let loaded = match self {
            DataSource::Stdin => loader.load_reader(stdin),
            DataSource::File(path) => loader.load_path(path),
        };
        loaded.map_err(|source| PipelineError::Load {
            input: self.to_string(),
            source,
        })
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Stdin => f.write_str("<stdin>"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load `source` and keep the records passing `filters`.
pub fn load_view<R: Read>(
    loader: &DataLoader,
    source: &DataSource,
    stdin: R,
    filters: &FilterSet,
) -> Result<Dataset, PipelineError> {
    let dataset = source.load(loader, stdin)?;
    let view = filters.apply(&dataset)?;
    if !filters.is_empty() {
        info!(before = dataset.len(), after = view.len(), "filters applied");
    }
    Ok(view)
}

/// Groups in output order: by the measure at `sort` (descending unless
/// `ascending`), or by key when no measure is named.
pub fn order_groups(
    result: &AggregationResult,
    sort: Option<usize>,
    ascending: bool,
) -> Result<Vec<(&String, &GroupSummary)>, PipelineError> {
    match sort {
        Some(index) if index >= result.measures.len() => Err(PipelineError::SortOutOfRange {
            index,
            measures: result.measures.len(),
        }),
        Some(index) => Ok(result.sorted_by(index, !ascending)),
        None => Ok(result.by_key()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderConfig;
    use crate::stats::{Aggregator, Measure};
    use std::io::{self, Cursor};

    const CSV: &str = "supplier,qty\nA,10\nA,5\nB,30\n";

    fn loader() -> DataLoader {
        DataLoader::new(LoaderConfig {
            required_columns: Vec::new(),
            ..LoaderConfig::default()
        })
    }

    #[test]
    fn resolves_sources() {
        let default = Path::new("supply_chain_data.csv");
        assert_eq!(DataSource::resolve(Some(Path::new("-")), default), DataSource::Stdin);
        assert_eq!(
            DataSource::resolve(Some(Path::new("a.csv")), default),
            DataSource::File(PathBuf::from("a.csv"))
        );
        assert_eq!(
            DataSource::resolve(None, default),
            DataSource::File(default.to_path_buf())
        );
    }

    #[test]
    fn stdin_source_reads_the_stream() {
        let ds = DataSource::Stdin.load(&loader(), Cursor::new(CSV)).unwrap();
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn file_source_ignores_stdin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        io::Write::write_all(&mut file, CSV.as_bytes()).unwrap();
        let source = DataSource::File(file.path().to_path_buf());
        let ds = source.load(&loader(), io::empty()).unwrap();
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn load_errors_name_the_input() {
        let err = DataSource::Stdin.load(&loader(), io::empty()).unwrap_err();
        assert_eq!(err.to_string(), "failed to load <stdin>");
        assert!(matches!(
            err,
            PipelineError::Load {
                source: LoaderError::Malformed(_),
                ..
            }
        ));
    }

    #[test]
    fn view_applies_filters() {
        let filters: FilterSet = std::iter::once("supplier=B".parse().unwrap()).collect();
        let view = load_view(&loader(), &DataSource::Stdin, Cursor::new(CSV), &filters).unwrap();
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn orders_groups_and_checks_the_sort_index() {
        let ds = loader().load_bytes(CSV).unwrap();
        let result = Aggregator::aggregate(&ds, "supplier", &[Measure::sum("qty")]).unwrap();
        fn keys(groups: Vec<(&String, &GroupSummary)>) -> Vec<String> {
            groups.into_iter().map(|(k, _)| k.clone()).collect()
        }

        assert_eq!(keys(order_groups(&result, None, false).unwrap()), vec!["A", "B"]);
        // A sums to 15 and B to 30.
        assert_eq!(keys(order_groups(&result, Some(0), false).unwrap()), vec!["B", "A"]);
        assert_eq!(keys(order_groups(&result, Some(0), true).unwrap()), vec!["A", "B"]);
        assert!(matches!(
            order_groups(&result, Some(1), false),
            Err(PipelineError::SortOutOfRange { index: 1, measures: 1 })
        ));
    }
}
