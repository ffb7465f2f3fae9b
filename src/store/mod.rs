//! Persistence contract for the normalized order table.
//!
//! Callers hold an `Arc<dyn OrderStore>` and never learn which backend is
//! behind it. Every backend enforces uniqueness on the tracking id and reports
//! a collision as [`StoreError::DuplicateTrackingId`].

pub mod memory;
pub mod sqlite;

#[cfg(test)]
pub(crate) mod test_support;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::order::{GeoPoint, Order, OrderPatch};

pub use memory::MemoryOrderStore;
pub use sqlite::SqliteOrderStore;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Writes a new order atomically. Existing rows are never overwritten.
    async fn insert(&self, order: Order) -> Result<String, StoreError>;

    /// Looks up by order item id first, then by tracking id. When several
    /// orders share an order item id the earliest inserted one wins.
    async fn find_by_tracking_key(&self, key: &str) -> Result<Option<Order>, StoreError>;

    /// `Ok(false)` when no order has this tracking id.
    async fn update(&self, tracking_id: &str, patch: OrderPatch) -> Result<bool, StoreError>;

    async fn delete(&self, tracking_id: &str) -> Result<bool, StoreError>;

    async fn all(&self) -> Result<Vec<Order>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    /// Branch coordinates of the oldest order shipped from `branch`
    /// (case-insensitive).
    async fn branch_location(&self, branch: &str) -> Result<Option<GeoPoint>, StoreError>;
}
