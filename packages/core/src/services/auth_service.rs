use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::models::auth::requests::{AccountKind, LoginRequest, RegistrationRequest};
use crate::models::auth::responses::LoginResponse;
use crate::models::claims::Claims;
use crate::models::navigation::Route;
use crate::models::session::Session;
use crate::repositories::session_store::SessionStore;
use crate::services::endpoints::own_profile_path;
use crate::services::errors::auth_service_errors::AuthServiceError;
use crate::services::errors::service_client_errors::ServiceClientError;
use crate::services::role_router;
use crate::services::service_client::ServiceClient;
use crate::services::session_events::{SessionEvent, SessionEvents};
use crate::services::token_codec;

pub const LOGIN_PATH: &str = "/users/login";
pub const REFRESH_PATH: &str = "/users/refresh-token";

#[async_trait]
pub trait AuthServiceTrait: Send + Sync {
    /// Logs in, persists the token pair and returns where to navigate.
    async fn login(&self, credentials: &LoginRequest) -> Result<Route, AuthServiceError>;
    async fn register(
        &self,
        kind: AccountKind,
        request: &RegistrationRequest,
    ) -> Result<Value, AuthServiceError>;
    async fn refresh(&self) -> Result<(), AuthServiceError>;
    async fn delete_account(&self) -> Result<(), AuthServiceError>;
    fn logout(&self) -> Result<(), AuthServiceError>;
    /// Claims of the stored token, decoded afresh on every call.
    fn current_claims(&self) -> Result<Claims, AuthServiceError>;
}

pub struct AuthService {
    identity: ServiceClient,
    store: Arc<dyn SessionStore>,
    events: SessionEvents,
}

impl AuthService {
    pub fn new(identity: ServiceClient, store: Arc<dyn SessionStore>, events: SessionEvents) -> Self {
        AuthService {
            identity,
            store,
            events,
        }
    }

    fn persist(&self, session: Session) -> Result<Claims, AuthServiceError> {
        self.store.save(&session)?;
        token_codec::decode(&session.access_token).map_err(|e| {
            error!("Discarding unreadable token from identity service: {}", e);
            if let Err(clear_err) = self.store.clear() {
                error!("Failed to clear session: {}", clear_err);
            }
            AuthServiceError::MalformedToken(e)
        })
    }
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    async fn login(&self, credentials: &LoginRequest) -> Result<Route, AuthServiceError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthServiceError::InvalidCredentials);
        }

        let response: LoginResponse = self
            .identity
            .post(LOGIN_PATH, credentials)
            .await
            .map_err(|e| match e {
                ServiceClientError::Unauthorized => AuthServiceError::InvalidCredentials,
                other => AuthServiceError::ServiceClient(other),
            })?;

        let claims = self.persist(Session::from(response))?;
        let route = role_router::route_for(&claims);
        info!(
            "Login successful for {} as {}, navigating to {}",
            credentials.email,
            claims.role(),
            route
        );
        Ok(route)
    }

    async fn register(
        &self,
        kind: AccountKind,
        request: &RegistrationRequest,
    ) -> Result<Value, AuthServiceError> {
        let path = format!("/users/register/{}", kind.path_segment());
        let created: Value = self.identity.post(&path, request).await.map_err(|e| {
            error!("Failed to register {}: {}", request.email, e);
            AuthServiceError::from(e)
        })?;
        debug!("Registered {} account for {}", kind.path_segment(), request.email);
        Ok(created)
    }

    async fn refresh(&self) -> Result<(), AuthServiceError> {
        let session = self.store.load()?.ok_or(AuthServiceError::NotLoggedIn)?;
        let response: LoginResponse = self
            .identity
            .post(REFRESH_PATH, &json!({ "refresh_token": session.refresh_token.as_str() }))
            .await?;

        let mut renewed = Session::from(response);
        if renewed.refresh_token.is_empty() {
            renewed.refresh_token = session.refresh_token;
        }
        self.persist(renewed)?;
        debug!("Access token refreshed");
        Ok(())
    }

    async fn delete_account(&self) -> Result<(), AuthServiceError> {
        let role = self.current_claims()?.role();
        self.identity.delete::<Value>(own_profile_path(role)).await?;
        self.store.clear()?;
        self.events.emit(SessionEvent::Cleared);
        info!("{} account deleted, session cleared", role);
        Ok(())
    }

    fn logout(&self) -> Result<(), AuthServiceError> {
        self.store.clear()?;
        self.events.emit(SessionEvent::Cleared);
        info!("Logged out");
        Ok(())
    }

    fn current_claims(&self) -> Result<Claims, AuthServiceError> {
        let session = self.store.load()?.ok_or(AuthServiceError::NotLoggedIn)?;
        token_codec::decode(&session.access_token).map_err(AuthServiceError::MalformedToken)
    }
}
