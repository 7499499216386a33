use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use slotbook::config::{AppConfig, StoreBackend};
use slotbook::handlers;
use slotbook::state::AppState;
use slotbook::store::{BookingStore, MemoryStore, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    // fail fast on a grid that could never produce slots
    config
        .grid()
        .generate(chrono::Local::now().date_naive(), config.step_minutes)?;

    let store: Arc<dyn BookingStore> = match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("using in-memory booking store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Sqlite => {
            tracing::info!("using sqlite booking store (path: {})", config.database_url);
            Arc::new(SqliteStore::open(&config.database_url)?)
        }
    };

    tracing::info!(
        open = config.open_hour,
        close = config.close_hour,
        step = config.step_minutes,
        "slot grid configured"
    );

    let port = config.port;
    let state = Arc::new(AppState::new(config, store));

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/slots", get(handlers::slots::list_slots))
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/admin/summary", get(handlers::admin::get_summary))
        .route("/api/admin/bookings", delete(handlers::admin::clear_bookings))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
