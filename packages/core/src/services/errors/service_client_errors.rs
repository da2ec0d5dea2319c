use std::fmt;

#[derive(Debug)]
pub enum ServiceClientError {
    /// No response arrived (connection refused, DNS, TLS, ...).
    Network(String),
    /// The service answered 401; the session has already been cleared.
    Unauthorized,
    /// The service answered 403 with this message.
    Forbidden(String),
    /// Any other non-2xx answer, message passed through verbatim.
    Status { status: u16, message: String },
    /// The stored token was expired; the call was not sent.
    SessionExpired,
    Deserialization(String),
}

impl ServiceClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceClientError::Unauthorized => Some(401),
            ServiceClientError::Forbidden(_) => Some(403),
            ServiceClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the session was destroyed as part of producing this error.
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            ServiceClientError::Unauthorized | ServiceClientError::SessionExpired
        )
    }
}

impl fmt::Display for ServiceClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServiceClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ServiceClientError::Unauthorized => write!(f, "Session expired. Please login again"),
            ServiceClientError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ServiceClientError::Status { status, message } => {
                write!(f, "Request failed with status {}: {}", status, message)
            }
            ServiceClientError::SessionExpired => {
                write!(f, "Access token expired before the request was sent")
            }
            ServiceClientError::Deserialization(msg) => {
                write!(f, "Unexpected response body: {}", msg)
            }
        }
    }
}

impl std::error::Error for ServiceClientError {}

impl From<reqwest::Error> for ServiceClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ServiceClientError::Deserialization(error.to_string())
        } else {
            ServiceClientError::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceClientError {
    fn from(error: serde_json::Error) -> Self {
        ServiceClientError::Deserialization(error.to_string())
    }
}
