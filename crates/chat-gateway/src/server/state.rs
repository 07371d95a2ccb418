//! Gateway state

use crate::broadcast::EventDispatcher;
use crate::connection::ConnectionManager;
use chat_cache::SharedPresenceRegistry;
use chat_common::{AppConfig, JwtService};
use chat_service::ServiceContext;
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    service_context: Arc<ServiceContext>,
    /// Verifies access tokens on Identify
    jwt_service: Arc<JwtService>,
    connection_manager: Arc<ConnectionManager>,
    /// Redis Pub/Sub to local connections
    event_dispatcher: Arc<EventDispatcher>,
    config: Arc<AppConfig>,
}

impl GatewayState {
    pub fn new(
        service_context: ServiceContext,
        jwt_service: Arc<JwtService>,
        connection_manager: Arc<ConnectionManager>,
        event_dispatcher: Arc<EventDispatcher>,
        config: AppConfig,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            jwt_service,
            connection_manager,
            event_dispatcher,
            config: Arc::new(config),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn presence(&self) -> &SharedPresenceRegistry {
        self.service_context.presence()
    }

    pub fn connection_manager(&self) -> &ConnectionManager {
        &self.connection_manager
    }

    pub fn event_dispatcher(&self) -> &EventDispatcher {
        &self.event_dispatcher
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connection_manager", &self.connection_manager)
            .field("presence", self.presence())
            .field("config", &"AppConfig")
            .finish()
    }
}
