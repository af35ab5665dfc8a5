//! Customer segmentation by demographics and by revenue cluster.

use super::{ReportError, ReportTable, Section};
use crate::data::schema::{CUSTOMER_DEMOGRAPHICS, REVENUE, REVENUE_CLUSTER, REVENUE_CLUSTER_LABELS};
use crate::data::Dataset;
use crate::stats::{Aggregator, Measure};

pub(super) fn build(dataset: &Dataset) -> Result<Vec<Section>, ReportError> {
    let demographics = Aggregator::aggregate(dataset, CUSTOMER_DEMOGRAPHICS, &[Measure::sum(REVENUE)])?;
    let demographic_table = ReportTable::from_groups(
        &[CUSTOMER_DEMOGRAPHICS, REVENUE],
        &demographics,
        &demographics.sorted_by(0, true),
    );

    let clusters = Aggregator::aggregate(
        dataset,
        REVENUE_CLUSTER,
        &[Measure::count(), Measure::sum(REVENUE)],
    )?;
    let cluster_table = ReportTable::from_groups(
        &["Customer Cluster", "Customers", REVENUE],
        &clusters,
        &clusters.in_order(&REVENUE_CLUSTER_LABELS),
    );

    Ok(vec![
        Section::table("Revenue by Demographics", demographic_table),
        Section::table("Revenue-based Customer Segmentation", cluster_table),
    ])
}
