use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::directory::{EmployeeDirectory, ProductCatalog};
use crate::engine::dates::expected_delivery;
use crate::error::{GeocodeError, StoreError};
use crate::geo::{haversine_km, Geocoder};
use crate::models::employee::Courier;
use crate::models::order::{GeoPoint, Order};
use crate::models::tracking::{TrackingView, UNKNOWN_LOCATION};
use crate::observability::metrics::Metrics;
use crate::store::OrderStore;

pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(5);

/// Serves the public tracking lookup.
///
/// Only the store can fail a request. Geocoding, driver and product lookups
/// degrade to sentinels or empty fields.
pub struct TrackingQueryService {
    store: Arc<dyn OrderStore>,
    employees: Arc<dyn EmployeeDirectory>,
    products: Arc<dyn ProductCatalog>,
    geocoder: Arc<dyn Geocoder>,
    geocode_timeout: Duration,
    metrics: Metrics,
}

impl TrackingQueryService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        employees: Arc<dyn EmployeeDirectory>,
        products: Arc<dyn ProductCatalog>,
        geocoder: Arc<dyn Geocoder>,
        metrics: Metrics,
    ) -> Self {
        Self {
            store,
            employees,
            products,
            geocoder,
            geocode_timeout: DEFAULT_GEOCODE_TIMEOUT,
            metrics,
        }
    }

    pub fn with_geocode_timeout(mut self, timeout: Duration) -> Self {
        self.geocode_timeout = timeout;
        self
    }

    /// `Ok(None)` when no order matches the key.
    pub async fn track(&self, key: &str) -> Result<Option<TrackingView>, StoreError> {
        let key = key.trim();
        let Some(order) = self.store.find_by_tracking_key(key).await? else {
            self.metrics
                .tracking_lookups_total
                .with_label_values(&["not_found"])
                .inc();
            debug!(key = %key, "tracking key not found");
            return Ok(None);
        };

        self.metrics
            .tracking_lookups_total
            .with_label_values(&["found"])
            .inc();

        Ok(Some(self.assemble(order).await))
    }

    async fn assemble(&self, order: Order) -> TrackingView {
        let expected_delivery_date = expected_delivery(order.eta, &order.order_date);

        let (customer_place, branch_place, courier, product_name) = tokio::join!(
            self.place_name(order.customer_point()),
            self.place_name(order.branch_point()),
            self.courier(order.driver_id),
            self.products.product_name(&order.order_item_id),
        );

        let package_state = order.package_state();
        let distance_km = haversine_km(&order.branch_point(), &order.customer_point());

        TrackingView {
            order_item_id: order.order_item_id,
            tracking_id: order.tracking_id,
            delivery_status: order.delivery_status,
            order_status: order.order_status,
            package_state,
            origin_branch: order.origin_branch,
            branch_latitude: order.branch_latitude,
            branch_longitude: order.branch_longitude,
            customer_latitude: order.customer_latitude,
            customer_longitude: order.customer_longitude,
            order_date: order.order_date,
            expected_delivery_date,
            customer_place,
            branch_place,
            distance_km: (distance_km * 100.0).round() / 100.0,
            driver_id: order.driver_id,
            product_name,
            courier,
        }
    }

    /// One attempt, bounded by the timeout; any failure reads as "Unknown Location".
    async fn place_name(&self, point: GeoPoint) -> String {
        let outcome = match tokio::time::timeout(self.geocode_timeout, self.geocoder.reverse(point)).await {
            Ok(result) => result,
            Err(_) => Err(GeocodeError::Timeout),
        };

        match outcome {
            Ok(place) => {
                self.metrics
                    .geocode_requests_total
                    .with_label_values(&["ok"])
                    .inc();
                place
            }
            Err(err) => {
                self.metrics
                    .geocode_requests_total
                    .with_label_values(&["fallback"])
                    .inc();
                warn!(lat = point.lat, lon = point.lng, error = %err, "reverse geocoding failed");
                UNKNOWN_LOCATION.to_string()
            }
        }
    }

    async fn courier(&self, driver_id: Option<i64>) -> Option<Courier> {
        let driver_id = driver_id?;
        let employee = self.employees.find_employee(driver_id).await;
        if employee.is_none() {
            debug!(driver_id, "assigned driver has no employee record");
        }
        employee.map(|employee| Courier::from_employee(employee, Utc::now().date_naive()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::TrackingQueryService;
    use crate::directory::{MemoryEmployeeDirectory, MemoryProductCatalog};
    use crate::error::GeocodeError;
    use crate::geo::Geocoder;
    use crate::models::employee::Employee;
    use crate::models::order::{GeoPoint, OrderPatch, PackageState};
    use crate::observability::metrics::Metrics;
    use crate::store::test_support::order;
    use crate::store::{MemoryOrderStore, OrderStore};

    struct NamedPlaces;

    #[async_trait]
    impl Geocoder for NamedPlaces {
        async fn reverse(&self, point: GeoPoint) -> Result<String, GeocodeError> {
            if point.lat > 14.6 {
                Ok("Quezon City".to_string())
            } else {
                Ok("Manila".to_string())
            }
        }
    }

    struct Broken;

    #[async_trait]
    impl Geocoder for Broken {
        async fn reverse(&self, _point: GeoPoint) -> Result<String, GeocodeError> {
            Err(GeocodeError::Status(500))
        }
    }

    struct Hanging;

    #[async_trait]
    impl Geocoder for Hanging {
        async fn reverse(&self, _point: GeoPoint) -> Result<String, GeocodeError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    struct Fixture {
        store: Arc<MemoryOrderStore>,
        employees: Arc<MemoryEmployeeDirectory>,
        products: Arc<MemoryProductCatalog>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: Arc::new(MemoryOrderStore::new()),
                employees: Arc::new(MemoryEmployeeDirectory::new()),
                products: Arc::new(MemoryProductCatalog::new()),
            }
        }

        fn service(&self, geocoder: impl Geocoder + 'static) -> TrackingQueryService {
            TrackingQueryService::new(
                self.store.clone(),
                self.employees.clone(),
                self.products.clone(),
                Arc::new(geocoder),
                Metrics::new(),
            )
        }
    }

    #[tokio::test]
    async fn unknown_key_is_absent_not_an_error() {
        let fixture = Fixture::new();
        let view = fixture.service(NamedPlaces).track("UNKNOWN-ID").await.unwrap();
        assert!(view.is_none());
    }

    #[tokio::test]
    async fn assembles_view_with_places_courier_and_product() {
        let fixture = Fixture::new();
        let mut shipment = order("HX-000000010001", "98765");
        shipment.driver_id = Some(3);
        fixture.store.insert(shipment).await.unwrap();
        fixture.products.record("98765", "Pelican Sunstream 100 Kayak");
        fixture.products.record("98766", "Perfect Fitness Perfect Rip Deck");
        fixture.employees.upsert(Employee {
            employee_id: 3,
            first_name: "Ramon".to_string(),
            last_name: "Cruz".to_string(),
            gender: "Male".to_string(),
            birthdate: NaiveDate::from_ymd_opt(1985, 2, 14),
            contact_number: "0917-555-0133".to_string(),
        });

        let view = fixture.service(NamedPlaces).track("98765").await.unwrap().unwrap();

        assert_eq!(view.tracking_id, "HX-000000010001");
        assert_eq!(view.expected_delivery_date, "2023-06-19");
        assert_eq!(view.customer_place, "Quezon City");
        assert_eq!(view.branch_place, "Manila");
        assert_eq!(view.package_state, PackageState::InTransit);
        assert_eq!(view.product_name.as_deref(), Some("Pelican Sunstream 100 Kayak"));
        assert!(view.distance_km > 5.0 && view.distance_km < 20.0);

        let courier = view.courier.unwrap();
        assert_eq!(courier.first_name, "Ramon");
        assert!(courier.age.unwrap() >= 38);
    }

    #[tokio::test]
    async fn geocoder_errors_become_unknown_location() {
        let fixture = Fixture::new();
        fixture.store.insert(order("HX-1", "item-1")).await.unwrap();

        let view = fixture.service(Broken).track("item-1").await.unwrap().unwrap();
        assert_eq!(view.customer_place, "Unknown Location");
        assert_eq!(view.branch_place, "Unknown Location");
    }

    #[tokio::test]
    async fn slow_geocoder_is_cut_off_by_the_timeout() {
        let fixture = Fixture::new();
        fixture.store.insert(order("HX-1", "item-1")).await.unwrap();

        let service = fixture
            .service(Hanging)
            .with_geocode_timeout(Duration::from_millis(50));
        let view = service.track("HX-1").await.unwrap().unwrap();

        assert_eq!(view.customer_place, "Unknown Location");
    }

    #[tokio::test]
    async fn missing_driver_record_and_eta_degrade_quietly() {
        let fixture = Fixture::new();
        let mut shipment = order("HX-1", "item-1");
        shipment.driver_id = Some(404);
        shipment.eta = None;
        fixture.store.insert(shipment).await.unwrap();

        let view = fixture.service(NamedPlaces).track("item-1").await.unwrap().unwrap();
        assert_eq!(view.driver_id, Some(404));
        assert!(view.courier.is_none());
        assert_eq!(view.expected_delivery_date, "2023-06-20");
        assert!(view.product_name.is_none());
    }

    #[tokio::test]
    async fn unreadable_order_date_without_eta_reads_unknown() {
        let fixture = Fixture::new();
        let mut shipment = order("HX-1", "item-1");
        shipment.eta = None;
        shipment.order_date = "31/31/2023".to_string();
        fixture.store.insert(shipment).await.unwrap();

        let view = fixture.service(NamedPlaces).track("HX-1").await.unwrap().unwrap();
        assert_eq!(view.expected_delivery_date, "Unknown");
    }

    #[tokio::test]
    async fn status_changes_are_re_resolved_on_read() {
        let fixture = Fixture::new();
        fixture.store.insert(order("HX-1", "item-1")).await.unwrap();
        let patch = OrderPatch {
            order_status: Some("CANCELED".to_string()),
            ..OrderPatch::default()
        };
        fixture.store.update("HX-1", patch).await.unwrap();

        let view = fixture.service(NamedPlaces).track("item-1").await.unwrap().unwrap();
        assert_eq!(view.delivery_status, "Shipping on time");
        assert_eq!(view.package_state, PackageState::Returned);
    }
}
