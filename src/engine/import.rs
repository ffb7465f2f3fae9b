//! Batch import of the shipment extract into the order store.
//!
//! Each row is committed on its own. A duplicate tracking id, a malformed cell
//! or a backend hiccup costs exactly that row; rows already written stay
//! written and the run always finishes with a report. Chunking only bounds how
//! many raw records are held at once.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::directory::MemoryProductCatalog;
use crate::engine::dates::{import_eta, parse_order_date, DATE_FORMAT, FALLBACK_ORDER_DATE};
use crate::engine::filler::{DisplayFiller, RandomFiller};
use crate::engine::seed::seed_records;
use crate::engine::status;
use crate::engine::tracking_id::TrackingIdGenerator;
use crate::error::{ImportError, RowError, StoreError};
use crate::models::order::{Order, PackageState};
use crate::models::source::{
    RawShipmentRecord, SourceSchema, COL_BRANCH_LATITUDE, COL_BRANCH_LONGITUDE,
    COL_CUSTOMER_LATITUDE, COL_CUSTOMER_LONGITUDE, COL_DRIVER_ID, COL_ORDER_ID,
    COL_ORDER_ITEM_ID, COL_SCHEDULED_DAYS,
};
use crate::store::OrderStore;

pub const DEFAULT_CHUNK_SIZE: usize = 100;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
    /// The source was abandoned and the built-in seed rows were loaded instead.
    pub seeded: bool,
    pub source_error: Option<String>,
}

type PendingRow = (usize, Result<RawShipmentRecord, String>);

pub struct ImportPipeline {
    store: Arc<dyn OrderStore>,
    ids: TrackingIdGenerator,
    filler: Arc<dyn DisplayFiller>,
    products: Option<Arc<MemoryProductCatalog>>,
    chunk_size: usize,
}

impl ImportPipeline {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            ids: TrackingIdGenerator::default(),
            filler: Arc::new(RandomFiller::new()),
            products: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
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

    /// Product names found in the extract are recorded here as rows land.
    pub fn with_products(mut self, products: Arc<MemoryProductCatalog>) -> Self {
        self.products = Some(products);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Imports already-read records. Row numbers in the report are 1-based.
    pub async fn import_batch(&self, rows: Vec<RawShipmentRecord>) -> ImportReport {
        let mut report = ImportReport::default();
        let mut pending: Vec<PendingRow> = Vec::with_capacity(self.chunk_size);

        for (index, raw) in rows.into_iter().enumerate() {
            pending.push((index + 1, Ok(raw)));
            if pending.len() == self.chunk_size {
                self.process_chunk(std::mem::take(&mut pending), &mut report).await;
            }
        }
        if !pending.is_empty() {
            self.process_chunk(pending, &mut report).await;
        }

        report
    }

    /// Imports a CSV extract. An unreadable source or a missing required
    /// column abandons the run and loads the seed dataset instead.
    pub async fn import_path(&self, path: &Path) -> ImportReport {
        let report = match self.import_csv(path).await {
            Ok(report) => report,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "source extract unusable; loading seed dataset");
                self.import_seed(Some(err)).await
            }
        };

        info!(
            path = %path.display(),
            imported = report.imported,
            skipped = report.skipped,
            errors = report.errors.len(),
            seeded = report.seeded,
            "shipment import finished"
        );

        report
    }

    /// Loads the built-in seed rows through the normal row path.
    pub async fn import_seed(&self, cause: Option<ImportError>) -> ImportReport {
        let mut report = self.import_batch(seed_records()).await;
        report.seeded = true;
        report.source_error = cause.map(|err| err.to_string());
        report
    }

    async fn import_csv(&self, path: &Path) -> Result<ImportReport, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|err| ImportError::SourceUnreadable(format!("{}: {err}", path.display())))?;

        let headers = reader
            .byte_headers()
            .map_err(|err| ImportError::SourceUnreadable(format!("{}: {err}", path.display())))?
            .clone();
        let schema = SourceSchema::from_headers(&headers)?;

        let mut report = ImportReport::default();
        let mut pending: Vec<PendingRow> = Vec::with_capacity(self.chunk_size);

        for (index, record) in reader.byte_records().enumerate() {
            let raw = record
                .map(|record| schema.record(&record))
                .map_err(|err| format!("unreadable record: {err}"));
            pending.push((index + 1, raw));

            if pending.len() == self.chunk_size {
                self.process_chunk(std::mem::take(&mut pending), &mut report).await;
            }
        }
        if !pending.is_empty() {
            self.process_chunk(pending, &mut report).await;
        }

        Ok(report)
    }

    async fn process_chunk(&self, rows: Vec<PendingRow>, report: &mut ImportReport) {
        let first_row = rows.first().map(|(row, _)| *row).unwrap_or_default();
        let size = rows.len();

        for (row, raw) in rows {
            match raw {
                Ok(raw) => self.import_row(row, &raw, report).await,
                Err(reason) => {
                    warn!(row, reason = %reason, "skipping malformed source row");
                    report.errors.push(RowError::new(row, reason));
                }
            }
        }

        debug!(
            first_row,
            size,
            imported = report.imported,
            skipped = report.skipped,
            errors = report.errors.len(),
            "import chunk processed"
        );
    }

    async fn import_row(&self, row: usize, raw: &RawShipmentRecord, report: &mut ImportReport) {
        let order = match self.derive_order(row, raw) {
            Ok(order) => order,
            Err(err) => {
                warn!(row, reason = %err.reason, "skipping malformed source row");
                report.errors.push(err);
                return;
            }
        };

        // Re-running an import must not duplicate rows already loaded.
        match self.store.find_by_tracking_key(&order.order_item_id).await {
            Ok(Some(existing)) if existing.order_item_id == order.order_item_id => {
                debug!(row, order_item_id = %order.order_item_id, "order item already stored; row skipped");
                report.skipped += 1;
                return;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(row, error = %err, "order lookup failed; row skipped");
                report.errors.push(RowError::new(row, err.to_string()));
                return;
            }
        }

        let order_item_id = order.order_item_id.clone();
        match self.store.insert(order).await {
            Ok(_) => {
                report.imported += 1;
                if let (Some(products), Some(name)) = (&self.products, &raw.product_name) {
                    products.record(order_item_id, name.clone());
                }
            }
            Err(StoreError::DuplicateTrackingId(tracking_id)) => {
                warn!(row, tracking_id = %tracking_id, "duplicate tracking id; row skipped");
                report.skipped += 1;
            }
            Err(err) => {
                warn!(row, error = %err, "order insert failed; row skipped");
                report.errors.push(RowError::new(row, err.to_string()));
            }
        }
    }

    /// Turns one raw record into a storable order. Fails only on required
    /// fields; a bad order date falls back to a fixed date instead.
    pub fn derive_order(&self, row: usize, raw: &RawShipmentRecord) -> Result<Order, RowError> {
        let order_id: i64 = parse_required(row, COL_ORDER_ID, &raw.order_id)?;
        if raw.order_item_id.trim().is_empty() {
            return Err(RowError::new(row, format!("{COL_ORDER_ITEM_ID}: missing value")));
        }

        let branch_latitude = parse_coordinate(row, COL_BRANCH_LATITUDE, &raw.branch_latitude, 90.0)?;
        let branch_longitude = parse_coordinate(row, COL_BRANCH_LONGITUDE, &raw.branch_longitude, 180.0)?;
        let customer_latitude = parse_coordinate(row, COL_CUSTOMER_LATITUDE, &raw.customer_latitude, 90.0)?;
        let customer_longitude = parse_coordinate(row, COL_CUSTOMER_LONGITUDE, &raw.customer_longitude, 180.0)?;

        let scheduled_shipping_days: Option<i64> =
            parse_optional(row, COL_SCHEDULED_DAYS, &raw.scheduled_shipping_days)?;
        let driver_id: Option<i64> =
            parse_optional(row, COL_DRIVER_ID, raw.driver_id.as_deref().unwrap_or_default())?;

        let order_date = parse_order_date(&raw.order_date).unwrap_or_else(|| {
            warn!(row, value = %raw.order_date, "unparseable order date; using fallback date");
            FALLBACK_ORDER_DATE
        });
        let order_date_text = order_date.format(DATE_FORMAT).to_string();
        let eta = import_eta(order_date, scheduled_shipping_days);

        let state = status::resolve(&raw.delivery_status, &raw.order_status);

        let destination = raw
            .customer_city
            .clone()
            .unwrap_or_else(|| format!("{customer_latitude:.4}, {customer_longitude:.4}"));

        Ok(Order {
            tracking_id: self.ids.generate(order_id),
            order_id,
            order_item_id: raw.order_item_id.trim().to_string(),
            delivery_status: raw.delivery_status.clone(),
            order_status: raw.order_status.clone(),
            origin_branch: raw.origin_branch.clone(),
            branch_latitude,
            branch_longitude,
            customer_latitude,
            customer_longitude,
            order_date: order_date_text.clone(),
            scheduled_shipping_days,
            driver_id,
            sender: self.filler.sender_name(),
            recipient: self.filler.recipient_name(),
            origin: raw.origin_branch.clone(),
            destination,
            package_size: self.filler.package_size(),
            weight: self.filler.weight(),
            date_shipped: order_date_text,
            eta,
            assigned_vehicle_label: raw.assigned_unit.clone(),
            notes: shipment_note(state).to_string(),
            created_at: Utc::now(),
        })
    }
}

pub fn shipment_note(state: PackageState) -> &'static str {
    match state {
        PackageState::InTransit => "Package is on its way.",
        PackageState::Delivered => "Package delivered to recipient.",
        PackageState::Pending => "Awaiting fulfillment.",
        PackageState::Returned => "Shipment returned to sender.",
    }
}

fn parse_required<T>(row: usize, column: &str, value: &str) -> Result<T, RowError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = value.trim();
    if value.is_empty() {
        return Err(RowError::new(row, format!("{column}: missing value")));
    }
    value
        .parse::<T>()
        .map_err(|err| RowError::new(row, format!("{column}: invalid value {value:?}: {err}")))
}

fn parse_optional<T>(row: usize, column: &str, value: &str) -> Result<Option<T>, RowError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_required(row, column, value).map(Some)
}

fn parse_coordinate(row: usize, column: &str, value: &str, limit: f64) -> Result<f64, RowError> {
    let coordinate: f64 = parse_required(row, column, value)?;
    if !coordinate.is_finite() || coordinate.abs() > limit {
        return Err(RowError::new(
            row,
            format!("{column}: {coordinate} outside [-{limit}, {limit}]"),
        ));
    }
    Ok(coordinate)
}
