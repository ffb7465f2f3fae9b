use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Customer-facing state shown by the tracking page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PackageState {
    InTransit,
    Delivered,
    Pending,
    Returned,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PackageSize {
    Small,
    Medium,
    Large,
    #[serde(rename = "Extra Large")]
    ExtraLarge,
}

impl PackageSize {
    pub const ALL: [PackageSize; 4] = [
        PackageSize::Small,
        PackageSize::Medium,
        PackageSize::Large,
        PackageSize::ExtraLarge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageSize::Small => "Small",
            PackageSize::Medium => "Medium",
            PackageSize::Large => "Large",
            PackageSize::ExtraLarge => "Extra Large",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.as_str() == raw)
    }
}

/// One shipment row in the normalized order store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub tracking_id: String,
    pub order_id: i64,
    pub order_item_id: String,
    pub delivery_status: String,
    pub order_status: String,
    pub origin_branch: String,
    pub branch_latitude: f64,
    pub branch_longitude: f64,
    pub customer_latitude: f64,
    pub customer_longitude: f64,
    /// Normalized `YYYY-MM-DD` for imported rows; rows written elsewhere may hold anything.
    pub order_date: String,
    pub scheduled_shipping_days: Option<i64>,
    pub driver_id: Option<i64>,
    pub sender: String,
    pub recipient: String,
    pub origin: String,
    pub destination: String,
    pub package_size: PackageSize,
    pub weight: f64,
    pub date_shipped: String,
    pub eta: Option<NaiveDate>,
    pub assigned_vehicle_label: Option<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn branch_point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.branch_latitude,
            lng: self.branch_longitude,
        }
    }

    pub fn customer_point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.customer_latitude,
            lng: self.customer_longitude,
        }
    }

    pub fn package_state(&self) -> PackageState {
        crate::engine::status::resolve(&self.delivery_status, &self.order_status)
    }

    pub fn apply(&mut self, patch: OrderPatch) {
        if let Some(delivery_status) = patch.delivery_status {
            self.delivery_status = delivery_status;
        }
        if let Some(order_status) = patch.order_status {
            self.order_status = order_status;
        }
        if let Some(driver_id) = patch.driver_id {
            self.driver_id = Some(driver_id);
        }
        if let Some(label) = patch.assigned_vehicle_label {
            self.assigned_vehicle_label = Some(label);
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
    }
}

/// Administrative changes to an existing order. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderPatch {
    pub delivery_status: Option<String>,
    pub order_status: Option<String>,
    pub driver_id: Option<i64>,
    pub assigned_vehicle_label: Option<String>,
    pub notes: Option<String>,
}

impl OrderPatch {
    pub fn is_empty(&self) -> bool {
        self.delivery_status.is_none()
            && self.order_status.is_none()
            && self.driver_id.is_none()
            && self.assigned_vehicle_label.is_none()
            && self.notes.is_none()
    }
}

/// Order as returned over HTTP, with its resolved customer-facing state.
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub package_state: PackageState,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let package_state = order.package_state();
        Self {
            order,
            package_state,
        }
    }
}
