//! Column names of the supply chain dataset and the columns each report page reads.

use crate::reports::Page;

pub const PRODUCT_TYPE: &str = "Product type";
pub const SKU: &str = "SKU";
pub const PRICE: &str = "Price";
pub const PRODUCTS_SOLD: &str = "Number of products sold";
pub const REVENUE: &str = "Revenue generated";
pub const CUSTOMER_DEMOGRAPHICS: &str = "Customer demographics";
pub const STOCK_LEVELS: &str = "Stock levels";
pub const SHIPPING_TIMES: &str = "Shipping times";
pub const SHIPPING_CARRIERS: &str = "Shipping carriers";
pub const SHIPPING_COSTS: &str = "Shipping costs";
pub const SUPPLIER_NAME: &str = "Supplier name";
pub const LEAD_TIME: &str = "Lead time";
pub const MANUFACTURING_COSTS: &str = "Manufacturing costs";
pub const DEFECT_RATES: &str = "Defect rates";
pub const TRANSPORTATION_MODES: &str = "Transportation modes";
pub const ROUTES: &str = "Routes";
pub const TRANSPORTATION_COSTS: &str = "Transportation_costs";

// Derived by the processor.
pub const PRICE_SEGMENT: &str = "Price segment";
pub const REVENUE_CLUSTER: &str = "Revenue cluster";
pub const DEFECT_CLUSTER: &str = "Defect cluster";

pub const PRICE_SEGMENT_LABELS: [&str; 3] = ["Low cost", "Medium range", "Premium"];
pub const REVENUE_CLUSTER_LABELS: [&str; 3] = [
    "Low Value Cluster",
    "Medium Value Cluster",
    "High Value Cluster",
];
pub const DEFECT_CLUSTER_LABELS: [&str; 3] = ["Low Defects", "Medium Defects", "High Defects"];

/// Columns the processor reads while building the derived columns.
pub const BASE_COLUMNS: [&str; 4] = [PRICE, REVENUE, SHIPPING_COSTS, DEFECT_RATES];

/// Columns a report page reads.
pub fn required_columns(page: Page) -> &'static [&'static str] {
    match page {
        Page::Executive => &[
            REVENUE,
            PRODUCTS_SOLD,
            SKU,
            PRODUCT_TYPE,
            SHIPPING_CARRIERS,
        ],
        Page::Overview => &[],
        Page::Product => &[SKU, PRODUCTS_SOLD, REVENUE, PRICE, PRICE_SEGMENT],
        Page::Customer => &[CUSTOMER_DEMOGRAPHICS, REVENUE, REVENUE_CLUSTER],
        Page::Supplier => &[
            SUPPLIER_NAME,
            LEAD_TIME,
            MANUFACTURING_COSTS,
            DEFECT_RATES,
            DEFECT_CLUSTER,
        ],
        Page::Logistics => &[
            SHIPPING_CARRIERS,
            SHIPPING_TIMES,
            SHIPPING_COSTS,
            TRANSPORTATION_MODES,
            ROUTES,
            TRANSPORTATION_COSTS,
        ],
        Page::Diagnostics => &[SUPPLIER_NAME, LEAD_TIME, STOCK_LEVELS, DEFECT_RATES],
    }
}
