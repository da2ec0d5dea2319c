use std::fmt;

/// Why an access token could not be read. Callers treat every variant as
/// "no session".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    TooFewSegments,
    InvalidBase64(String),
    InvalidJson(String),
    NotAnObject,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::TooFewSegments => write!(f, "Token has fewer than two segments"),
            DecodeError::InvalidBase64(msg) => write!(f, "Token payload is not base64url: {}", msg),
            DecodeError::InvalidJson(msg) => write!(f, "Token payload is not JSON: {}", msg),
            DecodeError::NotAnObject => write!(f, "Token payload is not a JSON object"),
        }
    }
}

impl std::error::Error for DecodeError {}
