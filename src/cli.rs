//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use supply_insight::data::ColumnFilter;
use supply_insight::{Measure, Page};

#[derive(Parser)]
#[command(
    name = "supply-insight",
    version,
    about = "Supply chain analytics over a CSV dataset",
    long_about = "Load a supply chain CSV and print the grouped aggregations and\n\
                  statistics behind the product, customer, supplier, logistics and\n\
                  diagnostic report pages."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Configuration file (default: ./supply_insight.toml when present).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print one or more report pages.
    Report(ReportArgs),

    /// Group records by a column and reduce each group.
    Aggregate(AggregateArgs),

    /// List dataset columns with their kind and missing count.
    Columns(ColumnsArgs),

    /// Start an interactive session.
    Session(SessionArgs),
}

#[derive(Args)]
pub struct DataArgs {
    /// CSV file to load, or `-` for stdin (default: the configured default dataset).
    #[arg(long, short = 'd', value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Keep records whose COLUMN is one of VALUES (repeatable).
    #[arg(long = "filter", short = 'f', value_name = "COLUMN=VALUE[,VALUE...]")]
    pub filters: Vec<ColumnFilter>,
}

#[derive(Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Page to print (repeatable; default: every page).
    #[arg(long = "page", short = 'p', value_name = "PAGE")]
    pub pages: Vec<Page>,

    /// Rows in top-N tables (overrides the config file).
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Records shown in the overview's dataset preview (overrides the config file).
    #[arg(long, value_name = "N")]
    pub preview_rows: Option<usize>,

    #[arg(long, value_enum, default_value = "table")]
    pub format: FormatArg,
}

#[derive(Args)]
pub struct AggregateArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Grouping column.
    #[arg(long, value_name = "COLUMN")]
    pub by: String,

    /// Measure: count, sum:COLUMN or mean:COLUMN (repeatable).
    #[arg(long = "measure", short = 'm', value_name = "MEASURE", required = true)]
    pub measures: Vec<Measure>,

    /// Sort by the measure at this position (0-based); default is key order.
    #[arg(long, value_name = "INDEX")]
    pub sort: Option<usize>,

    /// Sort ascending instead of descending.
    #[arg(long, requires = "sort")]
    pub ascending: bool,

    #[arg(long, value_enum, default_value = "table")]
    pub format: FormatArg,
}

#[derive(Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[arg(long, value_enum, default_value = "table")]
    pub format: FormatArg,
}

#[derive(Args)]
pub struct SessionArgs {
    /// CSV file to load at start (default: the configured default dataset, if present).
    #[arg(long, short = 'd', value_name = "CSV")]
    pub data: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Table,
    Json,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
