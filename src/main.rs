//! PolyPro market-data daemon
//!
//! Wires the feed core together: subscribes the configured instrument
//! groups on the market channel, drains the user channel into the own-order
//! ledger, and serves health/metrics for the UI's connectivity indicator.

use std::sync::Arc;
use axum::{extract::State, routing::get, Json, Router};
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use polypro_market_data::websocket::{FeedChannel, FeedConnection};
use polypro_market_data::{
    AppState, BookStore, Config, OwnOrderLedger, Publisher, SubscriptionCoordinator,
};

type SharedCoordinator = Arc<Mutex<SubscriptionCoordinator>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Starting PolyPro market-data core");

    let config = Arc::new(Config::load()?);
    info!(groups = config.groups.len(), "Configuration loaded");

    let publisher = Arc::new(Publisher::new(&config.ipc_socket_path).await?);

    let state = Arc::new(AppState {
        books: Arc::new(RwLock::new(BookStore::new())),
        orders: Arc::new(RwLock::new(OwnOrderLedger::new())),
        publisher,
        config: config.clone(),
    });

    // Market channel: one connection per instrument group.
    let coordinator: SharedCoordinator =
        Arc::new(Mutex::new(SubscriptionCoordinator::new(state.clone())));
    coordinator
        .lock()
        .await
        .sync_selection(config.groups.clone())
        .await;

    // User channel: a single long-lived connection feeding the own-order
    // ledger, when credentials are configured.
    let mut user_feed = None;
    if let Some(auth) = config.api_credentials.clone() {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (connection, _status_rx) =
            FeedConnection::new(state.clone(), FeedChannel::User { auth }, shutdown_rx);
        user_feed = Some((shutdown_tx, tokio::spawn(connection.run())));
    } else {
        info!("No API credentials configured, user channel disabled");
    }

    let health_state = coordinator.clone();
    let health_port = config.health_port;
    tokio::spawn(async move {
        if let Err(e) = start_health_server(health_state, health_port).await {
            warn!(error = %e, "Health server error");
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    coordinator.lock().await.shutdown().await;
    if let Some((shutdown_tx, task)) = user_feed {
        let _ = shutdown_tx.send(true);
        let _ = task.await;
    }

    Ok(())
}

/// HTTP server for health checks and metrics
async fn start_health_server(coordinator: SharedCoordinator, port: u16) -> anyhow::Result<()> {
    use std::net::SocketAddr;

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .with_state(coordinator);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "Starting health check server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Per-group connection state for the viewer's connectivity indicator
async fn health_check(State(coordinator): State<SharedCoordinator>) -> Json<serde_json::Value> {
    let connections: Vec<serde_json::Value> = coordinator
        .lock()
        .await
        .statuses()
        .into_iter()
        .map(|(group, state)| serde_json::json!({"group": group, "state": state}))
        .collect();

    Json(serde_json::json!({
        "status": "healthy",
        "component": "market-data",
        "connections": connections,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn metrics() -> String {
    use prometheus::{Encoder, TextEncoder};
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
