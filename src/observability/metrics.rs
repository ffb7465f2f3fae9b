use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

use crate::engine::import::ImportReport;

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub import_rows_total: IntCounterVec,
    pub import_duration_seconds: Histogram,
    pub tracking_lookups_total: IntCounterVec,
    pub geocode_requests_total: IntCounterVec,
    pub orders_in_store: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let import_rows_total = IntCounterVec::new(
            Opts::new("import_rows_total", "Imported source rows by outcome"),
            &["outcome"],
        )
        .expect("valid import_rows_total metric");

        let import_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("import_duration_seconds", "Wall time of one import run in seconds")
                .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0]),
        )
        .expect("valid import_duration_seconds metric");

        let tracking_lookups_total = IntCounterVec::new(
            Opts::new("tracking_lookups_total", "Tracking lookups by outcome"),
            &["outcome"],
        )
        .expect("valid tracking_lookups_total metric");

        let geocode_requests_total = IntCounterVec::new(
            Opts::new("geocode_requests_total", "Reverse geocoding calls by outcome"),
            &["outcome"],
        )
        .expect("valid geocode_requests_total metric");

        let orders_in_store = IntGauge::new("orders_in_store", "Orders currently stored")
            .expect("valid orders_in_store metric");

        registry
            .register(Box::new(import_rows_total.clone()))
            .expect("register import_rows_total");
        registry
            .register(Box::new(import_duration_seconds.clone()))
            .expect("register import_duration_seconds");
        registry
            .register(Box::new(tracking_lookups_total.clone()))
            .expect("register tracking_lookups_total");
        registry
            .register(Box::new(geocode_requests_total.clone()))
            .expect("register geocode_requests_total");
        registry
            .register(Box::new(orders_in_store.clone()))
            .expect("register orders_in_store");

        Self {
            registry,
            import_rows_total,
            import_duration_seconds,
            tracking_lookups_total,
            geocode_requests_total,
            orders_in_store,
        }
    }

    pub fn record_import(&self, report: &ImportReport, elapsed_secs: f64) {
        self.import_rows_total
            .with_label_values(&["imported"])
            .inc_by(report.imported as u64);
        self.import_rows_total
            .with_label_values(&["skipped"])
            .inc_by(report.skipped as u64);
        self.import_rows_total
            .with_label_values(&["error"])
            .inc_by(report.errors.len() as u64);
        self.import_duration_seconds.observe(elapsed_secs);
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
