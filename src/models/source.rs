//! Raw shipment records as they appear in the source extract.
//!
//! Every field is kept as the untouched cell text so that parse failures can be
//! reported per row by the import pipeline instead of failing the reader.
//! Cells are decoded leniently: bytes that are not UTF-8 (Latin-1 exports)
//! become U+FFFD instead of rejecting the row.

use std::borrow::Cow;

use csv::ByteRecord;
use serde::{Deserialize, Serialize};

use crate::error::ImportError;

pub const COL_ORDER_ID: &str = "Order Id";
pub const COL_ORDER_ITEM_ID: &str = "Order Item Id";
pub const COL_DELIVERY_STATUS: &str = "Delivery Status";
pub const COL_ORDER_STATUS: &str = "Order Status";
pub const COL_ORIGIN_BRANCH: &str = "Origin Branch";
pub const COL_BRANCH_LATITUDE: &str = "Branch Latitude";
pub const COL_BRANCH_LONGITUDE: &str = "Branch Longitude";
pub const COL_CUSTOMER_LATITUDE: &str = "Latitude";
pub const COL_CUSTOMER_LONGITUDE: &str = "Longitude";
pub const COL_ORDER_DATE: &str = "order date (DateOrders)";
pub const COL_SCHEDULED_DAYS: &str = "Days for shipment (scheduled)";
pub const COL_DRIVER_ID: &str = "Driver Id";
pub const COL_ASSIGNED_UNIT: &str = "Assigned Unit";
pub const COL_PRODUCT_NAME: &str = "Product Name";
pub const COL_CUSTOMER_CITY: &str = "Customer City";

pub const REQUIRED_COLUMNS: [&str; 11] = [
    COL_ORDER_ID,
    COL_ORDER_ITEM_ID,
    COL_DELIVERY_STATUS,
    COL_ORDER_STATUS,
    COL_ORIGIN_BRANCH,
    COL_BRANCH_LATITUDE,
    COL_BRANCH_LONGITUDE,
    COL_CUSTOMER_LATITUDE,
    COL_CUSTOMER_LONGITUDE,
    COL_ORDER_DATE,
    COL_SCHEDULED_DAYS,
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawShipmentRecord {
    pub order_id: String,
    pub order_item_id: String,
    pub delivery_status: String,
    pub order_status: String,
    pub origin_branch: String,
    pub branch_latitude: String,
    pub branch_longitude: String,
    pub customer_latitude: String,
    pub customer_longitude: String,
    pub order_date: String,
    pub scheduled_shipping_days: String,
    pub driver_id: Option<String>,
    pub assigned_unit: Option<String>,
    pub product_name: Option<String>,
    pub customer_city: Option<String>,
}

/// Column positions resolved from the extract's header row.
#[derive(Debug, Clone)]
pub struct SourceSchema {
    order_id: usize,
    order_item_id: usize,
    delivery_status: usize,
    order_status: usize,
    origin_branch: usize,
    branch_latitude: usize,
    branch_longitude: usize,
    customer_latitude: usize,
    customer_longitude: usize,
    order_date: usize,
    scheduled_shipping_days: usize,
    driver_id: Option<usize>,
    assigned_unit: Option<usize>,
    product_name: Option<usize>,
    customer_city: Option<usize>,
}

impl SourceSchema {
    pub fn from_headers(headers: &ByteRecord) -> Result<Self, ImportError> {
        let position = |name: &str| headers.iter().position(|header| decode(header).trim() == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| position(*name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        let required = |name: &str| {
            position(name).ok_or_else(|| ImportError::MissingColumns(vec![name.to_string()]))
        };

        Ok(Self {
            order_id: required(COL_ORDER_ID)?,
            order_item_id: required(COL_ORDER_ITEM_ID)?,
            delivery_status: required(COL_DELIVERY_STATUS)?,
            order_status: required(COL_ORDER_STATUS)?,
            origin_branch: required(COL_ORIGIN_BRANCH)?,
            branch_latitude: required(COL_BRANCH_LATITUDE)?,
            branch_longitude: required(COL_BRANCH_LONGITUDE)?,
            customer_latitude: required(COL_CUSTOMER_LATITUDE)?,
            customer_longitude: required(COL_CUSTOMER_LONGITUDE)?,
            order_date: required(COL_ORDER_DATE)?,
            scheduled_shipping_days: required(COL_SCHEDULED_DAYS)?,
            driver_id: position(COL_DRIVER_ID),
            assigned_unit: position(COL_ASSIGNED_UNIT),
            product_name: position(COL_PRODUCT_NAME),
            customer_city: position(COL_CUSTOMER_CITY),
        })
    }

    /// Cells beyond the end of a short record read as empty.
    pub fn record(&self, row: &ByteRecord) -> RawShipmentRecord {
        let cell = |index: usize| {
            row.get(index)
                .map(|value| decode(value).trim().to_string())
                .unwrap_or_default()
        };
        let optional = |index: Option<usize>| {
            index
                .and_then(|index| row.get(index))
                .map(|value| decode(value).trim().to_string())
                .filter(|value| !value.is_empty())
        };

        RawShipmentRecord {
            order_id: cell(self.order_id),
            order_item_id: cell(self.order_item_id),
            delivery_status: cell(self.delivery_status),
            order_status: cell(self.order_status),
            origin_branch: cell(self.origin_branch),
            branch_latitude: cell(self.branch_latitude),
            branch_longitude: cell(self.branch_longitude),
            customer_latitude: cell(self.customer_latitude),
            customer_longitude: cell(self.customer_longitude),
            order_date: cell(self.order_date),
            scheduled_shipping_days: cell(self.scheduled_shipping_days),
            driver_id: optional(self.driver_id),
            assigned_unit: optional(self.assigned_unit),
            product_name: optional(self.product_name),
            customer_city: optional(self.customer_city),
        }
    }
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

#[cfg(test)]
mod tests {
    use csv::ByteRecord;

    use super::*;
    use crate::error::ImportError;

    fn full_headers() -> ByteRecord {
        let mut headers: Vec<&str> = REQUIRED_COLUMNS.to_vec();
        headers.push(COL_DRIVER_ID);
        headers.push(COL_PRODUCT_NAME);
        ByteRecord::from(headers)
    }

    fn scenario_row(product_name: &[u8]) -> ByteRecord {
        let mut row = ByteRecord::from(vec![
            "12345",
            "98765",
            "Shipping on time",
            "PROCESSING",
            "Manila Hub",
            "14.5995",
            "120.9842",
            "14.6760",
            "121.0437",
            "2023-06-15",
            "4",
            "  ",
        ]);
        row.push_field(product_name);
        row
    }

    #[test]
    fn missing_required_columns_are_all_reported() {
        let headers = ByteRecord::from(vec![COL_ORDER_ID, COL_ORDER_ITEM_ID]);
        match SourceSchema::from_headers(&headers) {
            Err(ImportError::MissingColumns(missing)) => {
                assert_eq!(missing.len(), REQUIRED_COLUMNS.len() - 2);
                assert!(missing.contains(&COL_ORDER_DATE.to_string()));
            }
            other => panic!("expected missing columns, got {other:?}"),
        }
    }

    #[test]
    fn record_maps_cells_and_blank_optionals() {
        let schema = SourceSchema::from_headers(&full_headers()).unwrap();

        let record = schema.record(&scenario_row(b""));
        assert_eq!(record.order_id, "12345");
        assert_eq!(record.origin_branch, "Manila Hub");
        assert_eq!(record.scheduled_shipping_days, "4");
        assert_eq!(record.driver_id, None);
        assert_eq!(record.product_name, None);
    }

    #[test]
    fn latin1_cells_are_decoded_lossily() {
        let schema = SourceSchema::from_headers(&full_headers()).unwrap();

        let record = schema.record(&scenario_row(b"Caf\xe9 Set"));
        assert_eq!(record.order_item_id, "98765");
        assert_eq!(record.product_name.as_deref(), Some("Caf\u{FFFD} Set"));
    }
}
