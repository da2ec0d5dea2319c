use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use uuid::Uuid;
use wiremock::MockServer;

use vrms_core::config::{FallbackPolicy, ServiceRegistry};
use vrms_core::repositories::session_store::{
    FileSessionStore, InMemorySessionStore, SessionStore,
};
use vrms_core::services::admin_overview_service::AdminOverviewService;
use vrms_core::services::auth_service::AuthService;
use vrms_core::services::authorization_gate::AuthorizationGate;
use vrms_core::services::service_client::{ServiceClientFactory, ServiceClients};
use vrms_core::services::session_events::SessionEvents;

pub fn random_email() -> String {
    format!("it_{}@example.org", Uuid::new_v4())
}

/// Everything a screen would be wired with, backed by one store.
pub struct TestHarness {
    pub store: Arc<dyn SessionStore>,
    pub events: SessionEvents,
    pub clients: ServiceClients,
    pub auth_service: AuthService,
    pub gate: AuthorizationGate,
}

impl TestHarness {
    pub fn new(registry: &ServiceRegistry, store: Arc<dyn SessionStore>) -> Self {
        let events = SessionEvents::new();
        let clients = ServiceClientFactory::new(store.clone(), events.clone()).build_all(registry);
        TestHarness {
            auth_service: AuthService::new(clients.identity.clone(), store.clone(), events.clone()),
            gate: AuthorizationGate::new(store.clone()),
            store,
            events,
            clients,
        }
    }

    pub fn in_memory(server: &MockServer) -> Self {
        Self::new(
            &ServiceRegistry::single(server.uri()),
            Arc::new(InMemorySessionStore::new()),
        )
    }

    pub fn overview(&self, fallback: FallbackPolicy) -> AdminOverviewService {
        AdminOverviewService::new(self.clients.clone(), fallback)
    }
}

/// A session file inside a fresh temp dir. Keep the dir alive for the test.
pub fn temp_session_file() -> (TempDir, PathBuf, Arc<dyn SessionStore>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("session.json");
    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(path.clone()));
    (dir, path, store)
}
