//! HTTP entry point: wires the posting core's services onto axum routes
//! (spec §6). Mirrors `gl-rs`'s `main.rs` — load env, init tracing, build
//! the pool/event bus, serve.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use distributed_lock::LockService;
use event_bus::{EventBus, InMemoryBus, NatsBus};
use health::HealthState;
use ledger_core_service::config::Config;
use ledger_core_service::metrics::Metrics;
use ledger_core_service::state::AppState;
use ledger_core_service::routes;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("starting ledger-core-service");

    let config = Config::from_env().expect("failed to load configuration from environment");

    tracing::info!(
        host = %config.host,
        port = config.port,
        bus_type = %config.bus_type,
        "configuration loaded"
    );

    tracing::info!("connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let event_bus: Arc<dyn EventBus> = match config.bus_type.to_lowercase().as_str() {
        "inmemory" => {
            tracing::info!("using in-memory event bus");
            Arc::new(InMemoryBus::new())
        }
        "nats" => {
            tracing::info!(url = %config.nats_url, "connecting to NATS");
            let client = async_nats::connect(&config.nats_url)
                .await
                .expect("failed to connect to NATS");
            Arc::new(NatsBus::new(client))
        }
        other => panic!("invalid BUS_TYPE: {other}. must be 'inmemory' or 'nats'"),
    };

    let lock = match &config.redis_url {
        Some(redis_url) => {
            tracing::info!("connecting to redis for best-effort document locking");
            match LockService::connect(redis_url).await {
                Ok(service) => Some(Arc::new(service)),
                Err(err) => {
                    tracing::warn!(%err, "could not connect to redis, running without document locking");
                    None
                }
            }
        }
        None => {
            tracing::info!("REDIS_URL not set, running without best-effort document locking");
            None
        }
    };

    let metrics = Arc::new(Metrics::new());

    let state = AppState {
        pool: pool.clone(),
        event_bus,
        lock,
        metrics: metrics.clone(),
    };

    let health_pool = pool.clone();
    let health_state = HealthState::new("ledger-core-service", env!("CARGO_PKG_VERSION"))
        .with_check("database", Arc::new(move || !health_pool.is_closed()));

    let health_router = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/ready", get(health::ready))
        .with_state(health_state);

    let metrics_router = Router::new()
        .route("/metrics", get(metrics_route))
        .with_state(metrics);

    let command_router = routes::router().with_state(state);

    let app = Router::new()
        .merge(health_router)
        .merge(metrics_router)
        .merge(command_router)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "ledger-core-service listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind address");

    axum::serve(listener, app)
        .await
        .expect("server failed to start");
}

async fn metrics_route(State(metrics): State<Arc<Metrics>>) -> impl IntoResponse {
    match metrics.render() {
        Ok(body) => (StatusCode::OK, body),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics error: {err}")),
    }
}
