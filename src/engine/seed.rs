//! Built-in shipments loaded when the source extract cannot be read, so the
//! store is never left empty. A store holding only these rows is degraded.

use crate::models::source::RawShipmentRecord;

pub const SEED_ROW_COUNT: usize = 6;

struct SeedRow {
    order_id: &'static str,
    order_item_id: &'static str,
    delivery_status: &'static str,
    order_status: &'static str,
    origin_branch: &'static str,
    branch: (&'static str, &'static str),
    customer: (&'static str, &'static str),
    order_date: &'static str,
    scheduled_days: &'static str,
    driver_id: Option<&'static str>,
    assigned_unit: Option<&'static str>,
    product_name: &'static str,
    customer_city: &'static str,
}

const SEED_ROWS: [SeedRow; SEED_ROW_COUNT] = [
    SeedRow {
        order_id: "90001",
        order_item_id: "180001",
        delivery_status: "Shipping on time",
        order_status: "PROCESSING",
        origin_branch: "Manila Hub",
        branch: ("14.5995", "120.9842"),
        customer: ("14.6760", "121.0437"),
        order_date: "2023-06-15",
        scheduled_days: "4",
        driver_id: Some("1"),
        assigned_unit: Some("Van 03"),
        product_name: "Field & Stream Gun Safe",
        customer_city: "Quezon City",
    },
    SeedRow {
        order_id: "90002",
        order_item_id: "180002",
        delivery_status: "Late delivery",
        order_status: "COMPLETE",
        origin_branch: "Cebu Hub",
        branch: ("10.3157", "123.8854"),
        customer: ("10.2926", "123.9022"),
        order_date: "2023-06-10",
        scheduled_days: "2",
        driver_id: Some("2"),
        assigned_unit: Some("Truck 11"),
        product_name: "Perfect Fitness Perfect Rip Deck",
        customer_city: "Cebu City",
    },
    SeedRow {
        order_id: "90003",
        order_item_id: "180003",
        delivery_status: "Advance shipping",
        order_status: "PENDING_PAYMENT",
        origin_branch: "Davao Hub",
        branch: ("7.1907", "125.4553"),
        customer: ("7.0731", "125.6128"),
        order_date: "2023-06-18",
        scheduled_days: "1",
        driver_id: None,
        assigned_unit: None,
        product_name: "Nike Men's Dri-FIT Victory Golf Polo",
        customer_city: "Davao City",
    },
    SeedRow {
        order_id: "90004",
        order_item_id: "180004",
        delivery_status: "Shipping canceled",
        order_status: "CANCELED",
        origin_branch: "Manila Hub",
        branch: ("14.5995", "120.9842"),
        customer: ("14.5547", "121.0244"),
        order_date: "2023-06-12",
        scheduled_days: "4",
        driver_id: None,
        assigned_unit: None,
        product_name: "O'Brien Men's Neoprene Life Vest",
        customer_city: "Makati",
    },
    SeedRow {
        order_id: "90005",
        order_item_id: "180005",
        delivery_status: "Shipping on time",
        order_status: "ON_HOLD",
        origin_branch: "Iloilo Hub",
        branch: ("10.7202", "122.5621"),
        customer: ("10.6765", "122.9509"),
        order_date: "2023-06-20",
        scheduled_days: "",
        driver_id: None,
        assigned_unit: Some("Van 07"),
        product_name: "Under Armour Girls' Toddler Spine Surge Runni",
        customer_city: "Bacolod",
    },
    SeedRow {
        order_id: "90006",
        order_item_id: "180006",
        delivery_status: "Late delivery",
        order_status: "SUSPECTED_FRAUD",
        origin_branch: "Cebu Hub",
        branch: ("10.3157", "123.8854"),
        customer: ("10.3111", "123.9494"),
        order_date: "2023-06-11",
        scheduled_days: "2",
        driver_id: Some("2"),
        assigned_unit: Some("Truck 11"),
        product_name: "Pelican Sunstream 100 Kayak",
        customer_city: "Lapu-Lapu",
    },
];

pub fn seed_records() -> Vec<RawShipmentRecord> {
    SEED_ROWS
        .iter()
        .map(|row| RawShipmentRecord {
            order_id: row.order_id.to_string(),
            order_item_id: row.order_item_id.to_string(),
            delivery_status: row.delivery_status.to_string(),
            order_status: row.order_status.to_string(),
            origin_branch: row.origin_branch.to_string(),
            branch_latitude: row.branch.0.to_string(),
            branch_longitude: row.branch.1.to_string(),
            customer_latitude: row.customer.0.to_string(),
            customer_longitude: row.customer.1.to_string(),
            order_date: row.order_date.to_string(),
            scheduled_shipping_days: row.scheduled_days.to_string(),
            driver_id: row.driver_id.map(str::to_string),
            assigned_unit: row.assigned_unit.map(str::to_string),
            product_name: Some(row.product_name.to_string()),
            customer_city: Some(row.customer_city.to_string()),
        })
        .collect()
}
