use std::sync::Arc;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::Receiver;
use tracing::warn;

use vrms_core::models::navigation::Route;
use vrms_core::repositories::session_store::SessionStore;
use vrms_core::services::role_router;
use vrms_core::services::session_events::{SessionEvent, SessionEvents};
use vrms_core::services::token_codec;

/// Host-side subscriber that turns session events into navigation.
pub struct Navigator {
    receiver: Receiver<SessionEvent>,
    store: Arc<dyn SessionStore>,
}

impl Navigator {
    pub fn subscribe(events: &SessionEvents, store: Arc<dyn SessionStore>) -> Self {
        Navigator {
            receiver: events.subscribe(),
            store,
        }
    }

    /// Consumes pending events and returns where to go, if anywhere.
    ///
    /// Losing the session outranks a refusal, which outranks a logout.
    pub fn drain(&mut self) -> Option<Route> {
        let mut invalidated = false;
        let mut forbidden = false;
        let mut cleared = false;
        loop {
            match self.receiver.try_recv() {
                Ok(SessionEvent::Invalidated { service, path }) => {
                    warn!("Session invalidated by {} service at {}", service, path);
                    invalidated = true;
                }
                Ok(SessionEvent::Forbidden {
                    service,
                    path,
                    message,
                }) => {
                    println!("Access denied: {}", message);
                    warn!("{} service refused {}", service, path);
                    forbidden = true;
                }
                Ok(SessionEvent::Cleared) => cleared = true,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Missed {} session events", skipped);
                    invalidated = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        if invalidated {
            Some(Route::Login)
        } else if forbidden {
            Some(self.own_dashboard())
        } else if cleared {
            Some(Route::Home)
        } else {
            None
        }
    }

    /// The current user's dashboard, or login when there is no readable session.
    fn own_dashboard(&self) -> Route {
        match self.store.load() {
            Ok(Some(session)) => token_codec::decode(&session.access_token)
                .map(|claims| role_router::route_for(&claims))
                .unwrap_or(Route::Login),
            Ok(None) => Route::Login,
            Err(e) => {
                warn!("Could not read session after refusal: {}", e);
                Route::Login
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vrms_core::config::ServiceRegistry;
    use vrms_core::models::session::Session;
    use vrms_core::repositories::session_store::InMemorySessionStore;
    use vrms_core::services::service_client::{ServiceClientFactory, ServiceName};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ngo_token(user_id: u64) -> String {
        let payload = json!({"role": "NGO", "userId": user_id}).to_string();
        format!("h.{}.s", base64_url(payload.as_bytes()))
    }

    fn base64_url(bytes: &[u8]) -> String {
        use base64::{engine::general_purpose, Engine as _};
        general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    fn navigator() -> (SessionEvents, Navigator) {
        let events = SessionEvents::new();
        let navigator = Navigator::subscribe(&events, Arc::new(InMemorySessionStore::new()));
        (events, navigator)
    }

    #[test]
    fn test_no_events_means_no_navigation() {
        let (_events, mut navigator) = navigator();
        assert_eq!(navigator.drain(), None);
    }

    #[test]
    fn test_invalidation_wins_over_logout() {
        let (events, mut navigator) = navigator();
        events.emit(SessionEvent::Cleared);
        events.emit(SessionEvent::Invalidated {
            service: ServiceName::Analytics,
            path: "/analytics/dashboard".to_string(),
        });
        assert_eq!(navigator.drain(), Some(Route::Login));
        assert_eq!(navigator.drain(), None);
    }

    #[test]
    fn test_logout_goes_home() {
        let (events, mut navigator) = navigator();
        events.emit(SessionEvent::Cleared);
        assert_eq!(navigator.drain(), Some(Route::Home));
    }

    #[test]
    fn test_refusal_without_session_goes_to_login() {
        let (events, mut navigator) = navigator();
        events.emit(SessionEvent::Forbidden {
            service: ServiceName::Identity,
            path: "/users/7".to_string(),
            message: "Not allowed".to_string(),
        });
        assert_eq!(navigator.drain(), Some(Route::Login));
    }

    #[tokio::test]
    async fn test_forbidden_response_sends_user_to_own_dashboard() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/99"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"message": "You can only view your own profile"})),
            )
            .mount(&server)
            .await;

        let session = Session::new(ngo_token(42), "r1");
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::with_session(&session));
        let events = SessionEvents::new();
        let mut navigator = Navigator::subscribe(&events, store.clone());
        let clients = ServiceClientFactory::new(store.clone(), events)
            .build_all(&ServiceRegistry::single(server.uri()));

        assert!(clients.user("99").await.is_err());

        assert_eq!(
            navigator.drain(),
            Some(Route::NgoDashboard(Some("42".to_string())))
        );
        assert_eq!(store.load().unwrap(), Some(session));
    }
}
