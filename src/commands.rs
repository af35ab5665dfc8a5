//! Command implementations for the CLI.

use std::io;

use anyhow::{Context, Result};
use supply_insight::data::FilterSet;
use supply_insight::pipeline::{self, DataSource};
use supply_insight::render::{self, OutputFormat};
use supply_insight::session::Session;
use supply_insight::{build_report, Aggregator, Config, DataLoader, Dataset, Page};
use tracing::debug;

use crate::cli::{AggregateArgs, ColumnsArgs, DataArgs, FormatArg, ReportArgs, SessionArgs};

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Table => OutputFormat::Table,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Load the dataset named on the command line and apply its filters.
fn load_view(config: &Config, args: &DataArgs) -> Result<Dataset> {
    let source = DataSource::resolve(args.data.as_deref(), &config.loader.default_dataset);
    let loader = DataLoader::new(config.loader.clone());
    let filters: FilterSet = args.filters.iter().cloned().collect();
    Ok(pipeline::load_view(&loader, &source, io::stdin().lock(), &filters)?)
}

pub fn run_report(config: &Config, args: &ReportArgs) -> Result<()> {
    let view = load_view(config, &args.data)?;
    let mut options = config.report.options();
    if let Some(top) = args.top {
        options.top_n = top;
    }
    if let Some(rows) = args.preview_rows {
        options.preview_rows = rows;
    }
    let pages: Vec<Page> = if args.pages.is_empty() {
        Page::ALL.to_vec()
    } else {
        args.pages.clone()
    };

    let format = OutputFormat::from(args.format);
    let reports = pages
        .iter()
        .map(|&page| build_report(page, &view, &options))
        .collect::<Result<Vec<_>, _>>()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Table => {
            for report in &reports {
                println!("{}", render::render_report(report, format)?);
            }
        }
    }
    Ok(())
}

pub fn run_aggregate(config: &Config, args: &AggregateArgs) -> Result<()> {
    let view = load_view(config, &args.data)?;
    let result = Aggregator::aggregate(&view, &args.by, &args.measures)?;

    let groups = pipeline::order_groups(&result, args.sort, args.ascending)?;
    debug!(groups = groups.len(), "aggregation ready");

    print!(
        "{}",
        render::render_aggregation(&result, &groups, args.format.into())?
    );
    Ok(())
}

pub fn run_columns(config: &Config, args: &ColumnsArgs) -> Result<()> {
    let view = load_view(config, &args.data)?;
    print!("{}", render::render_columns(&view.columns(), args.format.into())?);
    Ok(())
}

pub fn run_session(config: &Config, args: &SessionArgs) -> Result<()> {
    let loader = DataLoader::new(config.loader.clone());
    let mut session = Session::new(loader, config.report.options());

    match &args.data {
        Some(path) => {
            let rows = session
                .load_path(path)
                .with_context(|| format!("loading {}", path.display()))?;
            println!("loaded {rows} records from {}", path.display());
        }
        None => {
            let fallback = &config.loader.default_dataset;
            if fallback.is_file() {
                let rows = session
                    .load_path(fallback)
                    .with_context(|| format!("loading {}", fallback.display()))?;
                println!("using default dataset {} ({rows} records)", fallback.display());
            } else {
                println!("no dataset loaded; use `load <path>`");
            }
        }
    }
    println!("type `help` for commands");

    let stdin = io::stdin();
    session.run(stdin.lock(), io::stdout())?;
    Ok(())
}

