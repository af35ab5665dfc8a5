//! Session Module
//! The session-scoped dataset, its filters, and the interactive shell driving
//! load -> filter -> aggregate -> display.

use crate::data::{ColumnFilter, DataLoader, Dataset, FilterError, FilterSet, LoaderError};
use crate::render::{self, OutputFormat};
use crate::reports::{build_report, Page, Report, ReportError, ReportOptions};
use crate::stats::{AggregateError, AggregationResult, Aggregator, Measure};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no dataset loaded (use `load <path>`)")]
    NoDataset,
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

/// Outcome of one shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Output(String),
    Quit,
}

const HELP: &str = "\
commands:
  load <path>                      load a CSV file, replacing the current dataset
  page <name>                      show a report page
  pages                            list report pages
  columns                          list dataset columns
  filter <column> = <v1>, <v2>     keep records whose column is one of the values
  unfilter [<column>]              drop one filter, or all of them
  filters                          show active filters
  format table|json                switch output format
  help                             show this help
  quit                             leave the session
";

/// One user's view of a dataset.
pub struct Session {
    loader: DataLoader,
    options: ReportOptions,
    format: OutputFormat,
    dataset: Option<Dataset>,
    source: Option<PathBuf>,
    filters: FilterSet,
}

impl Session {
    pub fn new(loader: DataLoader, options: ReportOptions) -> Self {
        Self {
            loader,
            options,
            format: OutputFormat::default(),
            dataset: None,
            source: None,
            filters: FilterSet::new(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Load a file, replacing the dataset wholesale and clearing filters.
    ///
    /// A failed load leaves the previous dataset in place.
    pub fn load_path(&mut self, path: &Path) -> Result<usize, SessionError> {
        let dataset = self.loader.load_path(path)?;
        self.source = Some(path.to_path_buf());
        Ok(self.replace(dataset))
    }

    /// Load CSV bytes, replacing the dataset wholesale and clearing filters.
    pub fn load_bytes(&mut self, bytes: impl Into<Vec<u8>>) -> Result<usize, SessionError> {
        let dataset = self.loader.load_bytes(bytes)?;
        self.source = None;
        Ok(self.replace(dataset))
    }

    fn replace(&mut self, dataset: Dataset) -> usize {
        let rows = dataset.len();
        if !self.filters.is_empty() {
            info!("dataset replaced, clearing filters");
        }
        self.filters.clear();
        self.dataset = Some(dataset);
        rows
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Add or replace the filter on a column. Unknown columns are rejected.
    pub fn set_filter(&mut self, filter: ColumnFilter) -> Result<(), SessionError> {
        let dataset = self.dataset.as_ref().ok_or(SessionError::NoDataset)?;
        dataset
            .require("Filter", &[filter.column.as_str()])
            .map_err(FilterError::from)?;
        self.filters.set(filter);
        Ok(())
    }

    pub fn remove_filter(&mut self, column: &str) -> bool {
        self.filters.remove(column)
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// The loaded dataset with the current filters applied.
    pub fn view(&self) -> Result<Dataset, SessionError> {
        let dataset = self.dataset.as_ref().ok_or(SessionError::NoDataset)?;
        Ok(self.filters.apply(dataset)?)
    }

    pub fn report(&self, page: Page) -> Result<Report, SessionError> {
        let view = self.view()?;
        Ok(build_report(page, &view, &self.options)?)
    }

    pub fn aggregate(
        &self,
        dimension: &str,
        measures: &[Measure],
    ) -> Result<AggregationResult, SessionError> {
        let view = self.view()?;
        Ok(Aggregator::aggregate(&view, dimension, measures)?)
    }

    /// Run one shell command.
    pub fn execute(&mut self, line: &str) -> Result<Step, SessionError> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let output = match command.to_ascii_lowercase().as_str() {
            "" => String::new(),
            "quit" | "exit" => return Ok(Step::Quit),
            "help" => HELP.to_string(),
            "load" => {
                if rest.is_empty() {
                    return Err(SessionError::Usage("usage: load <path>".to_string()));
                }
                let rows = self.load_path(Path::new(rest))?;
                format!("loaded {rows} records from {rest}\n")
            }
            "pages" => Page::ALL
                .iter()
                .map(|p| format!("{:<12} {}\n", p.slug(), p.title()))
                .collect(),
            "page" => {
                let page: Page = rest
                    .parse()
                    .map_err(|e: crate::reports::PageParseError| SessionError::Usage(e.to_string()))?;
                render::render_report(&self.report(page)?, self.format)?
            }
            "columns" => {
                let dataset = self.dataset.as_ref().ok_or(SessionError::NoDataset)?;
                render::render_columns(&dataset.columns(), self.format)?
            }
            "filter" => {
                let filter: ColumnFilter = rest.parse()?;
                let column = filter.column.clone();
                self.set_filter(filter)?;
                format!("filter set on '{column}' ({} records match)\n", self.view()?.len())
            }
            "unfilter" => {
                if rest.is_empty() {
                    self.clear_filters();
                    "all filters cleared\n".to_string()
                } else if self.remove_filter(rest) {
                    format!("filter on '{rest}' removed\n")
                } else {
                    format!("no filter on '{rest}'\n")
                }
            }
            "filters" => {
                if self.filters.is_empty() {
                    "no active filters\n".to_string()
                } else {
                    self.filters
                        .iter()
                        .map(|(column, values)| {
                            let values: Vec<&str> = values.iter().map(String::as_str).collect();
                            format!("{column} = {}\n", values.join(", "))
                        })
                        .collect()
                }
            }
            "format" => {
                self.format = rest.parse().map_err(SessionError::Usage)?;
                format!("output format: {rest}\n")
            }
            other => {
                return Err(SessionError::Usage(format!(
                    "unknown command '{other}' (try `help`)"
                )))
            }
        };
        Ok(Step::Output(output))
    }

    /// Read commands until `quit` or end of input. Command errors are printed
    /// and the shell keeps going.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> io::Result<()> {
        write!(out, "> ")?;
        out.flush()?;
        for line in input.lines() {
            match self.execute(&line?) {
                Ok(Step::Quit) => break,
                Ok(Step::Output(text)) => write!(out, "{text}")?,
                Err(e) => {
                    warn!(error = %e, "command failed");
                    writeln!(out, "error: {e}")?;
                }
            }
            write!(out, "> ")?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderConfig;

    const CSV: &str = "\
Supplier name,Lead time,Price
Supplier 1,10,5.0
Supplier 1,20,7.0
Supplier 2,5,9.0
";

    fn session() -> Session {
        let loader = DataLoader::new(LoaderConfig {
            required_columns: Vec::new(),
            ..LoaderConfig::default()
        });
        Session::new(loader, ReportOptions::default())
    }

    #[test]
    fn reports_need_a_dataset() {
        let s = session();
        assert!(matches!(s.report(Page::Overview), Err(SessionError::NoDataset)));
    }

    #[test]
    fn filters_narrow_the_view() {
        let mut s = session();
        assert_eq!(s.load_bytes(CSV).unwrap(), 3);
        s.set_filter("Supplier name=Supplier 1".parse().unwrap()).unwrap();
        assert_eq!(s.view().unwrap().len(), 2);
        let result = s.aggregate("Supplier name", &[Measure::mean("Lead time")]).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.value("Supplier 1", 0), Some(15.0));
        // The loaded dataset itself is untouched.
        assert_eq!(s.dataset().unwrap().len(), 3);
    }

    #[test]
    fn reload_replaces_dataset_and_clears_filters() {
        let mut s = session();
        s.load_bytes(CSV).unwrap();
        s.set_filter("Supplier name=Supplier 2".parse().unwrap()).unwrap();
        s.load_bytes("Supplier name,Lead time\nSupplier 9,1\n").unwrap();
        assert!(s.filters().is_empty());
        assert_eq!(s.view().unwrap().len(), 1);
    }

    #[test]
    fn failed_reload_keeps_previous_dataset() {
        let mut s = session();
        s.load_bytes(CSV).unwrap();
        assert!(s.load_bytes("").is_err());
        assert_eq!(s.dataset().unwrap().len(), 3);
    }

    #[test]
    fn unknown_filter_column_is_rejected() {
        let mut s = session();
        s.load_bytes(CSV).unwrap();
        assert!(s.set_filter("Region=EU".parse().unwrap()).is_err());
        assert!(s.filters().is_empty());
    }

    #[test]
    fn shell_runs_commands_and_survives_errors() {
        let mut s = session();
        s.load_bytes(CSV).unwrap();
        let input = "filters\nfilter Supplier name = Supplier 2\nbogus\npage nowhere\nfilters\nquit\npages\n";
        let mut out = Vec::new();
        s.run(input.as_bytes(), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("no active filters"));
        assert!(out.contains("filter set on 'Supplier name' (1 records match)"));
        assert!(out.contains("error: unknown command 'bogus'"));
        assert!(out.contains("error: unknown page 'nowhere'"));
        assert!(out.contains("Supplier name = Supplier 2"));
        // Nothing after quit runs.
        assert!(!out.contains("Executive Summary"));
    }

    #[test]
    fn shell_renders_pages() {
        let mut s = session();
        s.load_bytes(CSV).unwrap();
        match s.execute("page overview").unwrap() {
            Step::Output(text) => {
                assert!(text.starts_with("Data Overview (3 records)"));
                assert!(text.contains("Statistical Summary"));
            }
            Step::Quit => panic!("unexpected quit"),
        }
        assert_eq!(s.execute("exit").unwrap(), Step::Quit);
    }
}
