use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Which registration endpoint a sign-up goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Volunteer,
    Ngo,
    Corporate,
}

impl AccountKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            AccountKind::Volunteer => "volunteer",
            AccountKind::Ngo => "ngo",
            AccountKind::Corporate => "corporate",
        }
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "volunteer" => Ok(AccountKind::Volunteer),
            "ngo" => Ok(AccountKind::Ngo),
            "corporate" => Ok(AccountKind::Corporate),
            other => Err(format!("Unknown account kind: {}", other)),
        }
    }
}

/// Sign-up payload. Kind-specific fields (skills, registrationNumber,
/// industry, ...) travel in `profile` and are flattened into the body.
#[derive(Clone, Deserialize, Serialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl RegistrationRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        RegistrationRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            profile: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.profile.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("profile", &self.profile)
            .finish()
    }
}
