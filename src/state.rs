use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::config::Config;
use crate::directory::{MemoryEmployeeDirectory, MemoryProductCatalog};
use crate::engine::checkout::Checkout;
use crate::engine::import::{ImportPipeline, ImportReport, DEFAULT_CHUNK_SIZE};
use crate::engine::tracking::{TrackingQueryService, DEFAULT_GEOCODE_TIMEOUT};
use crate::geo::Geocoder;
use crate::models::event::{OrderEvent, OrderEventKind};
use crate::observability::metrics::Metrics;
use crate::store::OrderStore;

#[derive(Debug, Clone)]
pub struct StateOptions {
    pub event_buffer_size: usize,
    pub import_chunk_size: usize,
    pub geocode_timeout: Duration,
    pub source_path: Option<PathBuf>,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            event_buffer_size: 1024,
            import_chunk_size: DEFAULT_CHUNK_SIZE,
            geocode_timeout: DEFAULT_GEOCODE_TIMEOUT,
            source_path: None,
        }
    }
}

impl From<&Config> for StateOptions {
    fn from(config: &Config) -> Self {
        Self {
            event_buffer_size: config.event_buffer_size,
            import_chunk_size: config.import_chunk_size,
            geocode_timeout: Duration::from_millis(config.geocoder_timeout_ms),
            source_path: config.source_path.clone(),
        }
    }
}

pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub employees: Arc<MemoryEmployeeDirectory>,
    pub products: Arc<MemoryProductCatalog>,
    pub tracking: TrackingQueryService,
    pub importer: ImportPipeline,
    pub checkout: Checkout,
    pub order_events_tx: broadcast::Sender<OrderEvent>,
    pub metrics: Metrics,
    source_path: Option<PathBuf>,
    import_lock: Mutex<()>,
    seeded: AtomicBool,
}

impl AppState {
    pub fn new(store: Arc<dyn OrderStore>, geocoder: Arc<dyn Geocoder>, options: StateOptions) -> Self {
        let (order_events_tx, _unused_rx) = broadcast::channel(options.event_buffer_size.max(1));
        let metrics = Metrics::new();
        let employees = Arc::new(MemoryEmployeeDirectory::new());
        let products = Arc::new(MemoryProductCatalog::new());

        let tracking = TrackingQueryService::new(
            store.clone(),
            employees.clone(),
            products.clone(),
            geocoder,
            metrics.clone(),
        )
        .with_geocode_timeout(options.geocode_timeout);

        let importer = ImportPipeline::new(store.clone())
            .with_products(products.clone())
            .with_chunk_size(options.import_chunk_size);

        Self {
            checkout: Checkout::new(store.clone()),
            store,
            employees,
            products,
            tracking,
            importer,
            order_events_tx,
            metrics,
            source_path: options.source_path,
            import_lock: Mutex::new(()),
            seeded: AtomicBool::new(false),
        }
    }

    /// True while the latest import that loaded rows came from the seed dataset.
    pub fn is_seeded(&self) -> bool {
        self.seeded.load(Ordering::Relaxed)
    }

    pub fn publish(&self, kind: OrderEventKind) {
        let _ = self.order_events_tx.send(OrderEvent::new(kind));
    }

    /// Runs one import. Concurrent runs queue behind each other.
    ///
    /// Without a path (given or configured) the seed dataset is loaded.
    pub async fn run_import(&self, path: Option<&Path>) -> ImportReport {
        let _guard = self.import_lock.lock().await;
        let started = Instant::now();

        let report = match path.or(self.source_path.as_deref()) {
            Some(path) => self.importer.import_path(path).await,
            None => {
                info!("no source extract configured; loading seed dataset");
                self.importer.import_seed(None).await
            }
        };

        self.metrics
            .record_import(&report, started.elapsed().as_secs_f64());
        if report.seeded {
            self.seeded.store(true, Ordering::Relaxed);
        } else if report.imported > 0 {
            self.seeded.store(false, Ordering::Relaxed);
        }
        self.refresh_order_gauge().await;

        self.publish(OrderEventKind::ImportCompleted {
            imported: report.imported,
            skipped: report.skipped,
            errors: report.errors.len(),
            seeded: report.seeded,
        });

        report
    }

    pub async fn refresh_order_gauge(&self) -> usize {
        match self.store.count().await {
            Ok(count) => {
                self.metrics.orders_in_store.set(count as i64);
                count
            }
            Err(err) => {
                warn!(error = %err, "failed to count stored orders");
                0
            }
        }
    }
}
