use std::sync::Arc;

use vrms_core::config::ClientConfig;
use vrms_core::repositories::session_store::{FileSessionStore, SessionStore};
use vrms_core::services::admin_overview_service::AdminOverviewService;
use vrms_core::services::auth_service::AuthService;
use vrms_core::services::authorization_gate::AuthorizationGate;
use vrms_core::services::service_client::{ServiceClientFactory, ServiceClients};
use vrms_core::services::session_events::SessionEvents;

/// Everything a command needs, wired once from configuration.
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub events: SessionEvents,
    pub clients: ServiceClients,
    pub auth_service: AuthService,
    pub gate: AuthorizationGate,
    pub overview_service: AdminOverviewService,
}

impl AppState {
    pub fn from_config(config: &ClientConfig) -> Self {
        let store: Arc<dyn SessionStore> =
            Arc::new(FileSessionStore::new(config.session_file.clone()));
        Self::with_store(config, store)
    }

    pub fn with_store(config: &ClientConfig, store: Arc<dyn SessionStore>) -> Self {
        let events = SessionEvents::new();
        let clients = ServiceClientFactory::new(store.clone(), events.clone())
            .build_all(&config.registry);

        AppState {
            auth_service: AuthService::new(clients.identity.clone(), store.clone(), events.clone()),
            gate: AuthorizationGate::new(store.clone()),
            overview_service: AdminOverviewService::new(clients.clone(), config.fallback),
            clients,
            events,
            store,
        }
    }
}
