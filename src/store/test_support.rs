use chrono::{NaiveDate, TimeZone, Utc};

use crate::models::order::{Order, PackageSize};

pub(crate) fn order(tracking_id: &str, order_item_id: &str) -> Order {
    Order {
        tracking_id: tracking_id.to_string(),
        order_id: 1,
        order_item_id: order_item_id.to_string(),
        delivery_status: "Shipping on time".to_string(),
        order_status: "PROCESSING".to_string(),
        origin_branch: "Manila Hub".to_string(),
        branch_latitude: 14.5995,
        branch_longitude: 120.9842,
        customer_latitude: 14.6760,
        customer_longitude: 121.0437,
        order_date: "2023-06-15".to_string(),
        scheduled_shipping_days: Some(4),
        driver_id: None,
        sender: "Maria Santos".to_string(),
        recipient: "Jose Garcia".to_string(),
        origin: "Manila Hub".to_string(),
        destination: "Quezon City".to_string(),
        package_size: PackageSize::Small,
        weight: 1.25,
        date_shipped: "2023-06-15".to_string(),
        eta: NaiveDate::from_ymd_opt(2023, 6, 19),
        assigned_vehicle_label: Some("Truck 12".to_string()),
        notes: String::new(),
        created_at: Utc.with_ymd_and_hms(2023, 6, 15, 8, 0, 0).unwrap(),
    }
}
