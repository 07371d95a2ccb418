//! Gateway server setup
//!
//! Builds the shared state, the router and the background jobs.

mod handler;
mod snapshots;
mod state;

pub use handler::{gateway_handler, HEARTBEAT_INTERVAL_MS};
pub use snapshots::spawn_online_snapshots;
pub use state::GatewayState;

use crate::broadcast::{EventDispatcher, EventDispatcherConfig};
use crate::connection::ConnectionManager;
use axum::{routing::get, Router};
use chat_cache::{OnlineStatsStore, PresenceRegistry, RedisPool, RedisPoolConfig};
use chat_common::{AppConfig, AppError, JwtService};
use chat_core::SnowflakeGenerator;
use chat_service::ServiceContext;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Connect to PostgreSQL and Redis and wire the gateway's dependencies
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    tracing::info!("Connecting to PostgreSQL...");
    let pool = chat_db::create_pool(&chat_db::PoolConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    chat_db::run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL connection established");

    tracing::info!("Connecting to Redis...");
    let redis_pool = RedisPool::new(RedisPoolConfig::from(&config.redis))
        .map_err(|e| AppError::Cache(e.to_string()))?;
    let shared_redis = Arc::new(redis_pool);
    tracing::info!("Redis pool created");

    let jwt_service = Arc::new(JwtService::from_config(&config.jwt));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));
    let presence = Arc::new(PresenceRegistry::new());

    let service_context = ServiceContext::from_infrastructure(
        pool,
        &shared_redis,
        presence.clone(),
        snowflake_generator,
    );

    let connection_manager = ConnectionManager::new_shared();

    let dispatcher_config = EventDispatcherConfig {
        redis_url: config.redis.url.clone(),
        ..EventDispatcherConfig::default()
    };
    let event_dispatcher = Arc::new(EventDispatcher::new(
        dispatcher_config,
        connection_manager.clone(),
    ));
    event_dispatcher.clone().start();

    let stats = OnlineStatsStore::new(shared_redis.as_ref().clone(), config.presence.history_size);
    spawn_online_snapshots(
        presence,
        stats,
        Duration::from_secs(config.presence.snapshot_interval_secs),
    );

    Ok(GatewayState::new(
        service_context,
        jwt_service,
        connection_manager,
        event_dispatcher,
        config,
    ))
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!("Starting Gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/gateway", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .gateway
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid gateway address: {e}")))?;

    let state = create_gateway_state(config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
