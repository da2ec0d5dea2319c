use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::ServiceRegistry;
use crate::repositories::errors::session_store_errors::SessionStoreError;
use crate::repositories::session_store::SessionStore;
use crate::services::errors::service_client_errors::ServiceClientError;
use crate::services::session_events::{SessionEvent, SessionEvents};
use crate::services::token_codec;

/// Logical backend services reachable from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceName {
    Identity,
    Postings,
    Matching,
    Analytics,
}

impl ServiceName {
    pub const ALL: [ServiceName; 4] = [
        ServiceName::Identity,
        ServiceName::Postings,
        ServiceName::Matching,
        ServiceName::Analytics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::Identity => "identity",
            ServiceName::Postings => "postings",
            ServiceName::Matching => "matching",
            ServiceName::Analytics => "analytics",
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paths that must never carry a bearer credential, so a stale token cannot
/// break re-authentication. Opportunity registration on the matching service
/// is an ordinary authenticated call.
pub fn is_auth_endpoint(path: &str) -> bool {
    path.contains("/users/login") || path.contains("/users/register")
}

/// HTTP client bound to one service, with the shared request and response
/// interceptors applied to every call. Calls are attempted exactly once.
#[derive(Clone)]
pub struct ServiceClient {
    name: ServiceName,
    base_url: String,
    http: reqwest::Client,
    store: Arc<dyn SessionStore>,
    events: SessionEvents,
}

impl ServiceClient {
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceClientError> {
        self.send::<(), T>(Method::GET, path, &[], None).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ServiceClientError> {
        self.send::<(), T>(Method::GET, path, query, None).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceClientError> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceClientError> {
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceClientError> {
        self.send::<(), T>(Method::DELETE, path, &[], None).await
    }

    /// Connectivity check. Any successful answer counts as reachable.
    pub async fn ping(&self, path: &str) -> bool {
        match self.get::<Value>(path).await {
            Ok(_) => true,
            Err(e) => {
                warn!("{} service unreachable at {}: {}", self.name, path, e);
                false
            }
        }
    }

    pub async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T, ServiceClientError> {
        let bearer = self.bearer_for(path).await?;

        debug!("{} API call: {} {}", self.name, method, path);
        let mut request = self
            .http
            .request(method, self.url(path))
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("{} service request to {} failed: {}", self.name, path, e);
            ServiceClientError::Network(e.to_string())
        })?;
        let response = self.intercept(response, path).await?;

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Request interceptor: decides which credential, if any, to attach.
    async fn bearer_for(&self, path: &str) -> Result<Option<String>, ServiceClientError> {
        if is_auth_endpoint(path) {
            return Ok(None);
        }

        // Store reads may touch the filesystem; keep them off the runtime threads.
        let store = self.store.clone();
        let loaded = tokio::task::spawn_blocking(move || store.load())
            .await
            .unwrap_or_else(|e| {
                Err(SessionStoreError::Io(format!("session read aborted: {}", e)))
            });

        let session = match loaded {
            Ok(Some(session)) => session,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("Could not read session, sending {} unauthenticated: {}", path, e);
                return Ok(None);
            }
        };

        // Undecodable tokens are still sent; the service has the final say.
        if let Ok(claims) = token_codec::decode(&session.access_token) {
            if claims.is_expired_at(Utc::now()) {
                info!("Access token expired before {} {}", self.name, path);
                self.invalidate(path);
                return Err(ServiceClientError::SessionExpired);
            }
        }

        Ok(Some(session.access_token))
    }

    /// Response interceptor: 401 destroys the session, 403 is announced so the
    /// host can move the user away; everything else is handed back untouched.
    async fn intercept(
        &self,
        response: Response,
        path: &str,
    ) -> Result<Response, ServiceClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            warn!("{} service rejected credentials for {}", self.name, path);
            self.invalidate(path);
            return Err(ServiceClientError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body, status);
        if status == StatusCode::FORBIDDEN {
            warn!("{} service refused {}: {}", self.name, path, message);
            self.events.emit(SessionEvent::Forbidden {
                service: self.name,
                path: path.to_string(),
                message: message.clone(),
            });
            return Err(ServiceClientError::Forbidden(message));
        }
        Err(ServiceClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    fn invalidate(&self, path: &str) {
        if let Err(e) = self.store.clear() {
            error!("Failed to clear session after rejection: {}", e);
        }
        self.events.emit(SessionEvent::Invalidated {
            service: self.name,
            path: path.to_string(),
        });
    }
}

/// Server message for a failed call: the `message` or `error` field of a
/// JSON body, else the raw body, else the status reason.
fn extract_message(body: &str, status: StatusCode) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(Value::String(message)) = map.get(key) {
                if !message.trim().is_empty() {
                    return message.clone();
                }
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

/// Builds service clients that share one HTTP connection pool, one session
/// store and one event bus.
#[derive(Clone)]
pub struct ServiceClientFactory {
    http: reqwest::Client,
    store: Arc<dyn SessionStore>,
    events: SessionEvents,
}

impl ServiceClientFactory {
    pub fn new(store: Arc<dyn SessionStore>, events: SessionEvents) -> Self {
        Self::with_http_client(reqwest::Client::new(), store, events)
    }

    pub fn with_http_client(
        http: reqwest::Client,
        store: Arc<dyn SessionStore>,
        events: SessionEvents,
    ) -> Self {
        ServiceClientFactory {
            http,
            store,
            events,
        }
    }

    pub fn build(&self, name: ServiceName, base_url: impl Into<String>) -> ServiceClient {
        ServiceClient {
            name,
            base_url: base_url.into(),
            http: self.http.clone(),
            store: self.store.clone(),
            events: self.events.clone(),
        }
    }

    pub fn build_all(&self, registry: &ServiceRegistry) -> ServiceClients {
        ServiceClients {
            identity: self.build(ServiceName::Identity, registry.base_url(ServiceName::Identity)),
            postings: self.build(ServiceName::Postings, registry.base_url(ServiceName::Postings)),
            matching: self.build(ServiceName::Matching, registry.base_url(ServiceName::Matching)),
            analytics: self.build(
                ServiceName::Analytics,
                registry.base_url(ServiceName::Analytics),
            ),
        }
    }
}

#[derive(Clone)]
pub struct ServiceClients {
    pub identity: ServiceClient,
    pub postings: ServiceClient,
    pub matching: ServiceClient,
    pub analytics: ServiceClient,
}

impl ServiceClients {
    pub fn get(&self, name: ServiceName) -> &ServiceClient {
        match name {
            ServiceName::Identity => &self.identity,
            ServiceName::Postings => &self.postings,
            ServiceName::Matching => &self.matching,
            ServiceName::Analytics => &self.analytics,
        }
    }
}
