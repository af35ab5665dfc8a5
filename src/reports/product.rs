//! Product analysis: top SKUs, price distribution, price histogram and price segments.

use super::{Cell, Metric, ReportError, ReportOptions, ReportTable, Section};
use crate::data::schema::{PRICE, PRICE_SEGMENT, PRICE_SEGMENT_LABELS, PRODUCTS_SOLD, REVENUE, SKU};
use crate::data::Dataset;
use crate::stats::{Aggregator, Measure, StatsCalculator};

pub(super) fn build(dataset: &Dataset, options: &ReportOptions) -> Result<Vec<Section>, ReportError> {
    let by_sku = Aggregator::aggregate(
        dataset,
        SKU,
        &[Measure::sum(PRODUCTS_SOLD), Measure::sum(REVENUE)],
    )?;
    let top: Vec<_> = by_sku
        .sorted_by(1, true)
        .into_iter()
        .take(options.top_n)
        .collect();
    let top_table = ReportTable::from_groups(&[SKU, PRODUCTS_SOLD, REVENUE], &by_sku, &top);

    let prices = dataset.present_numbers(PRICE)?;
    let summary = StatsCalculator::compute_descriptive_stats(&prices);
    // Outliers sit above the upper Tukey fence.
    let fence = summary.p75 + 1.5 * (summary.p75 - summary.p25);
    let outliers = prices.iter().filter(|&&p| p > fence).count();
    let distribution = vec![
        Metric::new("Products priced", Cell::count(summary.count)),
        Metric::new("Min", Cell::number(Some(summary.min))),
        Metric::new("25%", Cell::number(Some(summary.p25))),
        Metric::new("Median", Cell::number(Some(summary.median))),
        Metric::new("75%", Cell::number(Some(summary.p75))),
        Metric::new("Max", Cell::number(Some(summary.max))),
        Metric::new("Premium outlier fence", Cell::number(Some(fence))),
        Metric::new("Premium outliers", Cell::count(outliers)),
    ];

    let mut histogram_table = ReportTable::new(&["From", "To", "Products"]);
    for bin in StatsCalculator::histogram(&prices, options.histogram_bins) {
        histogram_table.push(vec![
            Cell::number(Some(bin.lower)),
            Cell::number(Some(bin.upper)),
            Cell::count(bin.count),
        ]);
    }

    let segments = Aggregator::aggregate(
        dataset,
        PRICE_SEGMENT,
        &[Measure::count(), Measure::sum(REVENUE), Measure::mean(REVENUE)],
    )?;
    let segment_table = ReportTable::from_groups(
        &["Price Segment", "Count", "Total Revenue", "Avg Revenue"],
        &segments,
        &segments.in_order(&PRICE_SEGMENT_LABELS),
    );

    Ok(vec![
        Section::table(format!("Top {} SKUs by Revenue", options.top_n), top_table),
        Section::metrics("Price Distribution", distribution),
        Section::table("Price Histogram", histogram_table),
        Section::table("Product Segmentation by Price", segment_table),
    ])
}
