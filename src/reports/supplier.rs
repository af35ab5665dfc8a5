//! Supplier analysis: lead times, cost against defects, and cost by defect cluster.

use super::{ReportError, ReportTable, Section};
use crate::data::schema::{
    DEFECT_CLUSTER, DEFECT_CLUSTER_LABELS, DEFECT_RATES, LEAD_TIME, MANUFACTURING_COSTS,
    SUPPLIER_NAME,
};
use crate::data::Dataset;
use crate::stats::{Aggregator, Measure};

pub(super) fn build(dataset: &Dataset) -> Result<Vec<Section>, ReportError> {
    let lead_times = Aggregator::aggregate(dataset, SUPPLIER_NAME, &[Measure::mean(LEAD_TIME)])?;
    let lead_table = ReportTable::from_groups(
        &[SUPPLIER_NAME, "Average Lead Time (days)"],
        &lead_times,
        &lead_times.by_key(),
    );

    let trade_off = Aggregator::aggregate(
        dataset,
        SUPPLIER_NAME,
        &[Measure::mean(MANUFACTURING_COSTS), Measure::mean(DEFECT_RATES)],
    )?;
    let trade_off_table = ReportTable::from_groups(
        &[SUPPLIER_NAME, "Avg Manufacturing Cost", "Avg Defect Rate"],
        &trade_off,
        &trade_off.by_key(),
    );

    let clusters = Aggregator::aggregate(
        dataset,
        DEFECT_CLUSTER,
        &[Measure::sum(MANUFACTURING_COSTS), Measure::mean(MANUFACTURING_COSTS)],
    )?;
    let cluster_table = ReportTable::from_groups(
        &["Defect Cluster", "Total Manufacturing Cost", "Avg Manufacturing Cost"],
        &clusters,
        &clusters.in_order(&DEFECT_CLUSTER_LABELS),
    );

    Ok(vec![
        Section::table("Average Lead Time per Supplier", lead_table),
        Section::table("Cost vs Defect Rates", trade_off_table),
        Section::table("Manufacturing Cost by Defect Cluster", cluster_table),
    ])
}
