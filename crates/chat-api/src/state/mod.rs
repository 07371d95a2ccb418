//! Application state
//!
//! Holds the service context, the token verifier and the handles the health
//! and stats endpoints query directly.

use std::sync::Arc;

use chat_cache::{OnlineStatsStore, SharedRedisPool};
use chat_common::{AppConfig, JwtService};
use chat_db::PgPool;
use chat_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    jwt_service: Arc<JwtService>,
    /// Readiness probe target
    pool: PgPool,
    /// Readiness probe target
    redis_pool: SharedRedisPool,
    online_stats: OnlineStatsStore,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        service_context: ServiceContext,
        jwt_service: Arc<JwtService>,
        pool: PgPool,
        redis_pool: SharedRedisPool,
        online_stats: OnlineStatsStore,
        config: AppConfig,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            jwt_service,
            pool,
            redis_pool,
            online_stats,
            config: Arc::new(config),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn redis_pool(&self) -> &SharedRedisPool {
        &self.redis_pool
    }

    pub fn online_stats(&self) -> &OnlineStatsStore {
        &self.online_stats
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("online_stats", &self.online_stats)
            .field("config", &"AppConfig")
            .finish_non_exhaustive()
    }
}
