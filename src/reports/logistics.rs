//! Logistics analysis: carriers, transportation modes and routes.

use super::{ReportError, ReportTable, Section};
use crate::data::schema::{
    ROUTES, SHIPPING_CARRIERS, SHIPPING_COSTS, SHIPPING_TIMES, TRANSPORTATION_COSTS,
    TRANSPORTATION_MODES,
};
use crate::data::Dataset;
use crate::stats::{Aggregator, Measure};

pub(super) fn build(dataset: &Dataset) -> Result<Vec<Section>, ReportError> {
    let carriers = Aggregator::aggregate(
        dataset,
        SHIPPING_CARRIERS,
        &[Measure::mean(SHIPPING_TIMES), Measure::mean(SHIPPING_COSTS)],
    )?;
    let carrier_table = ReportTable::from_groups(
        &[SHIPPING_CARRIERS, "Avg Shipping Time (days)", "Avg Shipping Cost"],
        &carriers,
        &carriers.by_key(),
    );

    let modes = Aggregator::aggregate(dataset, TRANSPORTATION_MODES, &[Measure::count()])?;
    let mode_table = ReportTable::from_groups(&["Mode", "Count"], &modes, &modes.sorted_by(0, true));

    let routes = Aggregator::aggregate(dataset, ROUTES, &[Measure::mean(TRANSPORTATION_COSTS)])?;
    let route_table = ReportTable::from_groups(
        &[ROUTES, "Avg Transportation Cost"],
        &routes,
        &routes.by_key(),
    );

    Ok(vec![
        Section::table("Average Shipping Times & Costs by Carrier", carrier_table),
        Section::table("Most Used Transportation Modes", mode_table),
        Section::table("Route-wise Cost Efficiency", route_table),
    ])
}
