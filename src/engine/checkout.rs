use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use serde::Deserialize;
use tracing::info;

use crate::engine::dates::{import_eta, parse_order_date, DATE_FORMAT};
use crate::engine::filler::{DisplayFiller, RandomFiller};
use crate::engine::import::shipment_note;
use crate::engine::tracking_id::TrackingIdGenerator;
use crate::error::AppError;
use crate::models::order::{Order, PackageState};
use crate::store::OrderStore;

pub const CHECKOUT_DELIVERY_STATUS: &str = "Shipping on time";
pub const CHECKOUT_ORDER_STATUS: &str = "PENDING";

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub origin_branch: String,
    pub schedule_date: String,
    pub customer_latitude: f64,
    pub customer_longitude: f64,
    /// Taken from an existing order of the same branch when omitted.
    pub branch_latitude: Option<f64>,
    pub branch_longitude: Option<f64>,
    pub customer_city: Option<String>,
}

/// Creates single orders from the storefront checkout flow.
pub struct Checkout {
    store: Arc<dyn OrderStore>,
    ids: TrackingIdGenerator,
    filler: Arc<dyn DisplayFiller>,
}

impl Checkout {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            ids: TrackingIdGenerator::default(),
            filler: Arc::new(RandomFiller::new()),
        }
    }

    pub fn with_id_generator(mut self, ids: TrackingIdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_filler(mut self, filler: Arc<dyn DisplayFiller>) -> Self {
        self.filler = filler;
        self
    }

    pub async fn create_order(&self, request: CheckoutRequest) -> Result<Order, AppError> {
        let origin_branch = request.origin_branch.trim().to_string();
        if origin_branch.is_empty() {
            return Err(AppError::BadRequest("origin_branch cannot be empty".to_string()));
        }

        let order_date = parse_order_date(&request.schedule_date).ok_or_else(|| {
            AppError::BadRequest(format!("invalid schedule_date {:?}", request.schedule_date))
        })?;

        check_coordinates(request.customer_latitude, request.customer_longitude, "customer")?;
        let (branch_latitude, branch_longitude) = match (request.branch_latitude, request.branch_longitude) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => self.known_branch_location(&origin_branch).await?,
        };
        check_coordinates(branch_latitude, branch_longitude, "branch")?;

        let order_id: i64 = rand::thread_rng().gen_range(1..=99_999_999);
        let tracking_id = self.ids.generate(order_id);
        let order_date_text = order_date.format(DATE_FORMAT).to_string();

        let order = Order {
            tracking_id: tracking_id.clone(),
            order_id,
            order_item_id: tracking_id,
            delivery_status: CHECKOUT_DELIVERY_STATUS.to_string(),
            order_status: CHECKOUT_ORDER_STATUS.to_string(),
            origin_branch: origin_branch.clone(),
            branch_latitude,
            branch_longitude,
            customer_latitude: request.customer_latitude,
            customer_longitude: request.customer_longitude,
            order_date: order_date_text.clone(),
            scheduled_shipping_days: None,
            driver_id: None,
            sender: self.filler.sender_name(),
            recipient: self.filler.recipient_name(),
            origin: origin_branch,
            destination: request.customer_city.unwrap_or_else(|| {
                format!("{:.4}, {:.4}", request.customer_latitude, request.customer_longitude)
            }),
            package_size: self.filler.package_size(),
            weight: self.filler.weight(),
            date_shipped: order_date_text,
            eta: import_eta(order_date, None),
            assigned_vehicle_label: None,
            notes: shipment_note(PackageState::Pending).to_string(),
            created_at: Utc::now(),
        };

        self.store.insert(order.clone()).await?;
        info!(tracking_id = %order.tracking_id, branch = %order.origin_branch, "checkout order created");

        Ok(order)
    }

    async fn known_branch_location(&self, branch: &str) -> Result<(f64, f64), AppError> {
        self.store
            .branch_location(branch)
            .await?
            .map(|point| (point.lat, point.lng))
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "unknown branch {branch}; supply branch_latitude and branch_longitude"
                ))
            })
    }
}

fn check_coordinates(lat: f64, lng: f64, what: &str) -> Result<(), AppError> {
    let valid = lat.is_finite() && lng.is_finite() && lat.abs() <= 90.0 && lng.abs() <= 180.0;
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("invalid {what} coordinates ({lat}, {lng})")))
    }
}
