use serde::{Deserialize, Serialize};

use crate::models::session::Session;

/// Token pair returned by the identity service on login or refresh.
///
/// Older gateway deployments answer in camelCase, and some send both
/// spellings at once; the snake_case value wins when both are present.
#[derive(Deserialize, Serialize)]
#[serde(try_from = "WireLoginResponse")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Deserialize)]
struct WireLoginResponse {
    access_token: Option<String>,
    #[serde(rename = "accessToken")]
    access_token_camel: Option<String>,
    refresh_token: Option<String>,
    #[serde(rename = "refreshToken")]
    refresh_token_camel: Option<String>,
}

impl TryFrom<WireLoginResponse> for LoginResponse {
    type Error = String;

    fn try_from(wire: WireLoginResponse) -> Result<Self, Self::Error> {
        let access_token = wire
            .access_token
            .or(wire.access_token_camel)
            .ok_or_else(|| "missing field `access_token`".to_string())?;
        Ok(LoginResponse {
            access_token,
            refresh_token: wire
                .refresh_token
                .or(wire.refresh_token_camel)
                .unwrap_or_default(),
        })
    }
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Session::new(response.access_token, response.refresh_token)
    }
}
