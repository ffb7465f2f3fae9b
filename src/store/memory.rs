use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::StoreError;
use crate::models::order::{GeoPoint, Order, OrderPatch};
use crate::store::OrderStore;

/// Order store backed by concurrent maps. Reads and writes are consistent per row.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: DashMap<String, Order>,
    /// Tracking ids per order item id, in insertion order.
    by_item_id: DashMap<String, Vec<String>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<String, StoreError> {
        let tracking_id = order.tracking_id.clone();
        let order_item_id = order.order_item_id.clone();

        match self.orders.entry(tracking_id.clone()) {
            Entry::Occupied(_) => return Err(StoreError::DuplicateTrackingId(tracking_id)),
            Entry::Vacant(slot) => {
                slot.insert(order);
            }
        }

        if !order_item_id.is_empty() {
            self.by_item_id
                .entry(order_item_id)
                .or_default()
                .push(tracking_id.clone());
        }

        Ok(tracking_id)
    }

    async fn find_by_tracking_key(&self, key: &str) -> Result<Option<Order>, StoreError> {
        let via_item_id = self
            .by_item_id
            .get(key)
            .and_then(|entry| entry.value().first().cloned())
            .and_then(|tracking_id| self.orders.get(&tracking_id).map(|o| o.value().clone()));

        if via_item_id.is_some() {
            return Ok(via_item_id);
        }

        Ok(self.orders.get(key).map(|entry| entry.value().clone()))
    }

    async fn update(&self, tracking_id: &str, patch: OrderPatch) -> Result<bool, StoreError> {
        match self.orders.get_mut(tracking_id) {
            Some(mut order) => {
                order.apply(patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, tracking_id: &str) -> Result<bool, StoreError> {
        match self.orders.remove(tracking_id) {
            Some((_, order)) => {
                if let Some(mut indexed) = self.by_item_id.get_mut(&order.order_item_id) {
                    indexed.retain(|id| id != tracking_id);
                }
                self.by_item_id
                    .remove_if(&order.order_item_id, |_, indexed| indexed.is_empty());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn all(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.tracking_id.cmp(&b.tracking_id))
        });
        Ok(orders)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.orders.len())
    }

    async fn branch_location(&self, branch: &str) -> Result<Option<GeoPoint>, StoreError> {
        let oldest = self
            .orders
            .iter()
            .filter(|entry| entry.value().origin_branch.eq_ignore_ascii_case(branch))
            .min_by(|a, b| {
                a.value()
                    .created_at
                    .cmp(&b.value().created_at)
                    .then_with(|| a.key().cmp(b.key()))
            })
            .map(|entry| entry.value().branch_point());
        Ok(oldest)
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryOrderStore;
    use crate::error::StoreError;
    use crate::models::order::OrderPatch;
    use crate::store::test_support::order;
    use crate::store::OrderStore;

    #[tokio::test]
    async fn duplicate_tracking_id_is_rejected_without_overwrite() {
        let store = MemoryOrderStore::new();
        store.insert(order("HX-000000010001", "item-1")).await.unwrap();

        let mut clash = order("HX-000000010001", "item-2");
        clash.notes = "second".to_string();
        let err = store.insert(clash).await.unwrap_err();

        assert!(matches!(err, StoreError::DuplicateTrackingId(id) if id == "HX-000000010001"));
        let kept = store.find_by_tracking_key("HX-000000010001").await.unwrap().unwrap();
        assert_eq!(kept.order_item_id, "item-1");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn lookup_prefers_order_item_id() {
        let store = MemoryOrderStore::new();
        store.insert(order("HX-A", "HX-B")).await.unwrap();
        store.insert(order("HX-B", "item-b")).await.unwrap();

        let found = store.find_by_tracking_key("HX-B").await.unwrap().unwrap();
        assert_eq!(found.tracking_id, "HX-A");

        let by_tracking = store.find_by_tracking_key("HX-A").await.unwrap().unwrap();
        assert_eq!(by_tracking.tracking_id, "HX-A");
        assert!(store.find_by_tracking_key("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_and_delete_report_presence() {
        let store = MemoryOrderStore::new();
        store.insert(order("HX-1", "item-1")).await.unwrap();

        let patch = OrderPatch {
            order_status: Some("COMPLETE".to_string()),
            driver_id: Some(9),
            ..OrderPatch::default()
        };
        assert!(store.update("HX-1", patch.clone()).await.unwrap());
        assert!(!store.update("HX-404", patch).await.unwrap());

        let updated = store.find_by_tracking_key("item-1").await.unwrap().unwrap();
        assert_eq!(updated.order_status, "COMPLETE");
        assert_eq!(updated.driver_id, Some(9));

        assert!(store.delete("HX-1").await.unwrap());
        assert!(!store.delete("HX-1").await.unwrap());
        assert!(store.find_by_tracking_key("item-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn shared_item_id_resolves_to_first_insert_until_deleted() {
        let store = MemoryOrderStore::new();
        store.insert(order("HX-OLD", "item-1")).await.unwrap();
        store.insert(order("HX-NEW", "item-1")).await.unwrap();

        let found = store.find_by_tracking_key("item-1").await.unwrap().unwrap();
        assert_eq!(found.tracking_id, "HX-OLD");

        assert!(store.delete("HX-NEW").await.unwrap());
        let found = store.find_by_tracking_key("item-1").await.unwrap().unwrap();
        assert_eq!(found.tracking_id, "HX-OLD");

        store.insert(order("HX-NEWER", "item-1")).await.unwrap();
        assert!(store.delete("HX-OLD").await.unwrap());
        let found = store.find_by_tracking_key("item-1").await.unwrap().unwrap();
        assert_eq!(found.tracking_id, "HX-NEWER");

        assert!(store.delete("HX-NEWER").await.unwrap());
        assert!(store.find_by_tracking_key("item-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn branch_location_matches_case_insensitively() {
        let store = MemoryOrderStore::new();
        store.insert(order("HX-1", "item-1")).await.unwrap();

        let point = store.branch_location("MANILA HUB").await.unwrap().unwrap();
        assert_eq!(point.lat, 14.5995);
        assert_eq!(point.lng, 120.9842);
        assert!(store.branch_location("Cebu Hub").await.unwrap().is_none());
    }
}
