use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use shipment_tracking::api;
use shipment_tracking::config::{Config, LogFormat};
use shipment_tracking::error::AppError;
use shipment_tracking::geo::NominatimClient;
use shipment_tracking::state::{AppState, StateOptions};
use shipment_tracking::store::{MemoryOrderStore, OrderStore, SqliteOrderStore};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    init_tracing(&config);

    let store: Arc<dyn OrderStore> = match &config.database_url {
        Some(url) => {
            let store = SqliteOrderStore::connect(url, config.db_max_connections).await?;
            tracing::info!(database_url = %url, "using sqlite order store");
            Arc::new(store)
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory order store");
            Arc::new(MemoryOrderStore::new())
        }
    };

    let geocoder = NominatimClient::new(
        &config.geocoder_base_url,
        &config.geocoder_user_agent,
        Duration::from_millis(config.geocoder_timeout_ms),
    )
    .map_err(|err| AppError::Internal(format!("failed to build geocoder client: {err}")))?;

    let shared_state = Arc::new(AppState::new(
        store,
        Arc::new(geocoder),
        StateOptions::from(&config),
    ));

    if config.import_on_startup {
        let report = shared_state.run_import(None).await;
        tracing::info!(
            imported = report.imported,
            skipped = report.skipped,
            errors = report.errors.len(),
            seeded = report.seeded,
            "startup import finished"
        );
    } else {
        shared_state.refresh_order_gauge().await;
    }

    let app = api::rest::router(shared_state.clone());

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);

    match config.log_format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
