use serde::{Deserialize, Serialize};

use crate::models::employee::Courier;
use crate::models::order::PackageState;

pub const UNKNOWN_LOCATION: &str = "Unknown Location";
pub const UNKNOWN_DATE: &str = "Unknown";

/// Public tracking page payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingView {
    pub order_item_id: String,
    pub tracking_id: String,
    pub delivery_status: String,
    pub order_status: String,
    pub package_state: PackageState,
    pub origin_branch: String,
    pub branch_latitude: f64,
    pub branch_longitude: f64,
    pub customer_latitude: f64,
    pub customer_longitude: f64,
    pub order_date: String,
    /// `YYYY-MM-DD`, or `"Unknown"` when the order date cannot be read.
    pub expected_delivery_date: String,
    pub customer_place: String,
    pub branch_place: String,
    pub distance_km: f64,
    pub driver_id: Option<i64>,
    pub product_name: Option<String>,
    pub courier: Option<Courier>,
}
