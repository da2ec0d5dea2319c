use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::models::claims::Claims;
use crate::models::navigation::{Route, Screen};
use crate::models::role::Role;
use crate::repositories::session_store::SessionStore;
use crate::services::errors::token_codec_errors::DecodeError;
use crate::services::token_codec;

#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    NoSession,
    StorageUnavailable(String),
    MalformedToken(DecodeError),
    RoleMismatch { required: Role, actual: Role },
    Expired,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rejection::NoSession => write!(f, "No active session"),
            Rejection::StorageUnavailable(msg) => write!(f, "Session unreadable: {}", msg),
            Rejection::MalformedToken(err) => write!(f, "Invalid token format: {}", err),
            Rejection::RoleMismatch { required, actual } => {
                write!(f, "Screen requires {} but session role is {}", required, actual)
            }
            Rejection::Expired => write!(f, "Session expired"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Entry allowed; the freshly decoded claims are handed to the screen.
    Authorized(Claims),
    RedirectToLogin(Rejection),
}

impl GateDecision {
    pub fn is_authorized(&self) -> bool {
        matches!(self, GateDecision::Authorized(_))
    }

    pub fn claims(&self) -> Option<&Claims> {
        match self {
            GateDecision::Authorized(claims) => Some(claims),
            GateDecision::RedirectToLogin(_) => None,
        }
    }

    /// Where the host should navigate, if anywhere.
    pub fn redirect(&self) -> Option<Route> {
        match self {
            GateDecision::Authorized(_) => None,
            GateDecision::RedirectToLogin(_) => Some(Route::Login),
        }
    }
}

/// Entry check run by every protected screen.
///
/// Every rejection clears the session so no invalid token outlives the check.
pub struct AuthorizationGate {
    store: Arc<dyn SessionStore>,
}

impl AuthorizationGate {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        AuthorizationGate { store }
    }

    pub fn evaluate(&self, screen: &Screen) -> GateDecision {
        self.evaluate_at(screen, Utc::now())
    }

    pub fn evaluate_at(&self, screen: &Screen, now: DateTime<Utc>) -> GateDecision {
        let session = match self.store.load() {
            Ok(Some(session)) => session,
            Ok(None) => return self.reject(screen, Rejection::NoSession),
            Err(e) => return self.reject(screen, Rejection::StorageUnavailable(e.to_string())),
        };

        let claims = match token_codec::decode(&session.access_token) {
            Ok(claims) => claims,
            Err(e) => return self.reject(screen, Rejection::MalformedToken(e)),
        };

        if let Some(required) = screen.required_role {
            let actual = claims.role();
            if actual != required {
                return self.reject(screen, Rejection::RoleMismatch { required, actual });
            }
        }

        if claims.is_expired_at(now) {
            return self.reject(screen, Rejection::Expired);
        }

        debug!("Entry to {} authorized", screen.name);
        GateDecision::Authorized(claims)
    }

    fn reject(&self, screen: &Screen, reason: Rejection) -> GateDecision {
        info!("Redirecting {} to login: {}", screen.name, reason);
        if let Err(e) = self.store.clear() {
            error!("Failed to clear session on rejection: {}", e);
        }
        GateDecision::RedirectToLogin(reason)
    }
}
