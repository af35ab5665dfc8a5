//! Executive summary: headline metrics, revenue by product type and carrier usage.

use super::{Cell, Metric, ReportError, ReportTable, Section};
use crate::data::schema::{PRODUCTS_SOLD, PRODUCT_TYPE, REVENUE, SHIPPING_CARRIERS, SKU};
use crate::data::Dataset;
use crate::stats::{Aggregator, Measure};
use std::collections::BTreeSet;

pub(super) fn build(dataset: &Dataset) -> Result<Vec<Section>, ReportError> {
    let total_revenue: f64 = dataset.present_numbers(REVENUE)?.iter().sum();
    let total_sold: f64 = dataset.present_numbers(PRODUCTS_SOLD)?.iter().sum();
    let unique_skus: BTreeSet<String> = dataset.text_values(SKU)?.into_iter().flatten().collect();

    let headline = vec![
        Metric::new("Total Records", Cell::count(dataset.len())),
        Metric::new("Total Revenue", Cell::Number(total_revenue)),
        Metric::new("Total Products Sold", Cell::Number(total_sold)),
        Metric::new("Unique SKUs", Cell::count(unique_skus.len())),
    ];

    let by_type = Aggregator::aggregate(dataset, PRODUCT_TYPE, &[Measure::sum(REVENUE)])?;
    let mut revenue_table = ReportTable::new(&[PRODUCT_TYPE, REVENUE, "Share (%)"]);
    for (key, summary) in by_type.sorted_by(0, true) {
        let revenue = summary.values[0];
        let share = revenue
            .filter(|_| total_revenue > 0.0)
            .map(|r| r / total_revenue * 100.0);
        revenue_table.push(vec![
            Cell::text(key.as_str()),
            Cell::number(revenue),
            Cell::number(share),
        ]);
    }

    let carriers = Aggregator::aggregate(dataset, SHIPPING_CARRIERS, &[Measure::count()])?;
    let carrier_table =
        ReportTable::from_groups(&["Carrier", "Count"], &carriers, &carriers.sorted_by(0, true));

    Ok(vec![
        Section::metrics("Key Metrics", headline),
        Section::table("Revenue by Product Type", revenue_table),
        Section::table("Shipping Carriers Distribution", carrier_table),
    ])
}
