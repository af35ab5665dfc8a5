#![allow(dead_code)]

use std::path::PathBuf;
use supply_insight::config::LoaderConfig;
use supply_insight::reports::{Cell, ReportTable};
use supply_insight::{DataLoader, Dataset};

pub fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/supply_chain_sample.csv")
}

pub fn load_sample() -> Dataset {
    DataLoader::new(LoaderConfig::default())
        .load_path(&sample_path())
        .expect("sample dataset loads")
}

/// The row whose first cell is `key`.
pub fn row<'a>(table: &'a ReportTable, key: &str) -> &'a [Cell] {
    table
        .rows
        .iter()
        .find(|r| r.first() == Some(&Cell::text(key)))
        .unwrap_or_else(|| panic!("no row '{key}'"))
}

pub fn number(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(v) => *v,
        Cell::Integer(i) => *i as f64,
        other => panic!("not numeric: {other:?}"),
    }
}
