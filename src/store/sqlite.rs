use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::error::StoreError;
use crate::models::order::{GeoPoint, Order, OrderPatch, PackageSize};
use crate::store::OrderStore;

const ORDER_COLUMNS: &str = "tracking_id, order_id, order_item_id, delivery_status, order_status, \
    origin_branch, branch_latitude, branch_longitude, customer_latitude, customer_longitude, \
    order_date, scheduled_shipping_days, driver_id, sender, recipient, origin, destination, \
    package_size, weight, date_shipped, eta, assigned_vehicle_label, notes, created_at";

/// Order store over a pooled SQLite database.
///
/// Each call checks a connection out of the pool for the duration of one
/// statement (or one transaction for inserts) and returns it on every exit path.
#[derive(Clone)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // An in-memory database lives and dies with its single connection.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self::from_pool(pool).await?;

        info!(database_url = %database_url, "opened sqlite order store");
        Ok(store)
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        create_orders_table(&pool).await?;
        Ok(Self { pool })
    }

    async fn find_one(&self, column: &str, key: &str) -> Result<Option<Order>, StoreError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE {column} = ? ORDER BY rowid LIMIT 1");
        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }
}

async fn create_orders_table(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            tracking_id TEXT NOT NULL UNIQUE,
            order_id INTEGER NOT NULL,
            order_item_id TEXT NOT NULL,
            delivery_status TEXT NOT NULL,
            order_status TEXT NOT NULL,
            origin_branch TEXT NOT NULL,
            branch_latitude REAL NOT NULL,
            branch_longitude REAL NOT NULL,
            customer_latitude REAL NOT NULL,
            customer_longitude REAL NOT NULL,
            order_date TEXT NOT NULL,
            scheduled_shipping_days INTEGER,
            driver_id INTEGER,
            sender TEXT NOT NULL,
            recipient TEXT NOT NULL,
            origin TEXT NOT NULL,
            destination TEXT NOT NULL,
            package_size TEXT NOT NULL,
            weight REAL NOT NULL,
            date_shipped TEXT NOT NULL,
            eta TEXT,
            assigned_vehicle_label TEXT,
            notes TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_order_item_id ON orders(order_item_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_orders_origin_branch ON orders(origin_branch COLLATE NOCASE)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn order_from_row(row: &SqliteRow) -> Result<Order, StoreError> {
    let package_size: String = row.try_get("package_size")?;
    let package_size = PackageSize::parse(&package_size)
        .ok_or_else(|| StoreError::Backend(format!("unknown package size {package_size}")))?;

    Ok(Order {
        tracking_id: row.try_get("tracking_id")?,
        order_id: row.try_get("order_id")?,
        order_item_id: row.try_get("order_item_id")?,
        delivery_status: row.try_get("delivery_status")?,
        order_status: row.try_get("order_status")?,
        origin_branch: row.try_get("origin_branch")?,
        branch_latitude: row.try_get("branch_latitude")?,
        branch_longitude: row.try_get("branch_longitude")?,
        customer_latitude: row.try_get("customer_latitude")?,
        customer_longitude: row.try_get("customer_longitude")?,
        order_date: row.try_get("order_date")?,
        scheduled_shipping_days: row.try_get("scheduled_shipping_days")?,
        driver_id: row.try_get("driver_id")?,
        sender: row.try_get("sender")?,
        recipient: row.try_get("recipient")?,
        origin: row.try_get("origin")?,
        destination: row.try_get("destination")?,
        package_size,
        weight: row.try_get("weight")?,
        date_shipped: row.try_get("date_shipped")?,
        eta: row.try_get::<Option<NaiveDate>, _>("eta")?,
        assigned_vehicle_label: row.try_get("assigned_vehicle_label")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn insert_error(err: sqlx::Error, tracking_id: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::DuplicateTrackingId(tracking_id.to_string())
        }
        _ => StoreError::from(err),
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn insert(&self, order: Order) -> Result<String, StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO orders ({ORDER_COLUMNS}) VALUES \
             (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        sqlx::query(&sql)
            .bind(&order.tracking_id)
            .bind(order.order_id)
            .bind(&order.order_item_id)
            .bind(&order.delivery_status)
            .bind(&order.order_status)
            .bind(&order.origin_branch)
            .bind(order.branch_latitude)
            .bind(order.branch_longitude)
            .bind(order.customer_latitude)
            .bind(order.customer_longitude)
            .bind(&order.order_date)
            .bind(order.scheduled_shipping_days)
            .bind(order.driver_id)
            .bind(&order.sender)
            .bind(&order.recipient)
            .bind(&order.origin)
            .bind(&order.destination)
            .bind(order.package_size.as_str())
            .bind(order.weight)
            .bind(&order.date_shipped)
            .bind(order.eta)
            .bind(&order.assigned_vehicle_label)
            .bind(&order.notes)
            .bind(order.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|err| insert_error(err, &order.tracking_id))?;

        // Dropping an uncommitted transaction rolls it back.
        tx.commit().await?;

        Ok(order.tracking_id)
    }

    async fn find_by_tracking_key(&self, key: &str) -> Result<Option<Order>, StoreError> {
        if let Some(order) = self.find_one("order_item_id", key).await? {
            return Ok(Some(order));
        }
        self.find_one("tracking_id", key).await
    }

    async fn update(&self, tracking_id: &str, patch: OrderPatch) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                delivery_status = COALESCE(?, delivery_status),
                order_status = COALESCE(?, order_status),
                driver_id = COALESCE(?, driver_id),
                assigned_vehicle_label = COALESCE(?, assigned_vehicle_label),
                notes = COALESCE(?, notes)
            WHERE tracking_id = ?
            "#,
        )
        .bind(patch.delivery_status)
        .bind(patch.order_status)
        .bind(patch.driver_id)
        .bind(patch.assigned_vehicle_label)
        .bind(patch.notes)
        .bind(tracking_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, tracking_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM orders WHERE tracking_id = ?")
            .bind(tracking_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn all(&self) -> Result<Vec<Order>, StoreError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at, tracking_id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn branch_location(&self, branch: &str) -> Result<Option<GeoPoint>, StoreError> {
        let row: Option<(f64, f64)> = sqlx::query_as(
            "SELECT branch_latitude, branch_longitude FROM orders \
             WHERE origin_branch = ? COLLATE NOCASE \
             ORDER BY created_at, tracking_id LIMIT 1",
        )
        .bind(branch)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(lat, lng)| GeoPoint { lat, lng }))
    }
}
