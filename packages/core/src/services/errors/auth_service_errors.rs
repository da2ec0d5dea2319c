use crate::repositories::errors::session_store_errors::SessionStoreError;
use crate::services::errors::service_client_errors::ServiceClientError;
use crate::services::errors::token_codec_errors::DecodeError;
use std::fmt;

#[derive(Debug)]
pub enum AuthServiceError {
    ServiceClient(ServiceClientError),
    SessionStore(SessionStoreError),
    InvalidCredentials,
    MalformedToken(DecodeError),
    NotLoggedIn,
}

impl fmt::Display for AuthServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthServiceError::ServiceClient(err) => write!(f, "{}", err),
            AuthServiceError::SessionStore(err) => write!(f, "{}", err),
            AuthServiceError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthServiceError::MalformedToken(err) => {
                write!(f, "Identity service issued an unreadable token: {}", err)
            }
            AuthServiceError::NotLoggedIn => write!(f, "Not logged in"),
        }
    }
}

impl std::error::Error for AuthServiceError {}

impl From<ServiceClientError> for AuthServiceError {
    fn from(error: ServiceClientError) -> Self {
        AuthServiceError::ServiceClient(error)
    }
}

impl From<SessionStoreError> for AuthServiceError {
    fn from(error: SessionStoreError) -> Self {
        AuthServiceError::SessionStore(error)
    }
}
