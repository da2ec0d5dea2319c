#[derive(Debug)]
pub enum SessionStoreError {
    Io(String),
    Serialization(String),
}

impl std::fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStoreError::Io(msg) => write!(f, "Session storage I/O error: {}", msg),
            SessionStoreError::Serialization(msg) => {
                write!(f, "Session serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SessionStoreError {}

impl From<std::io::Error> for SessionStoreError {
    fn from(error: std::io::Error) -> Self {
        SessionStoreError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for SessionStoreError {
    fn from(error: serde_json::Error) -> Self {
        SessionStoreError::Serialization(error.to_string())
    }
}
