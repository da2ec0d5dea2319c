use serde::{Deserialize, Serialize};
use std::fmt;

/// Key under which the access token is persisted.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key under which the refresh token is persisted.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// A logged-in token pair. Either both halves exist or there is no session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Session {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Token material stays out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}
