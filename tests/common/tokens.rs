use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

const SIGNING_SECRET: &[u8] = b"integration-test-secret";

/// Signs `payload` as the identity service would. The client never checks
/// the signature, so any secret works.
pub fn signed_token(payload: Value) -> String {
    encode(
        &Header::default(),
        &payload,
        &EncodingKey::from_secret(SIGNING_SECRET),
    )
    .expect("Failed to sign test token")
}

pub fn token_for_role(role: &str, user_id: Value) -> String {
    signed_token(json!({
        "role": role,
        "userId": user_id,
        "exp": (Utc::now() + Duration::hours(1)).timestamp(),
    }))
}

pub fn expired_token_for_role(role: &str) -> String {
    signed_token(json!({
        "role": role,
        "exp": (Utc::now() - Duration::hours(1)).timestamp(),
    }))
}

/// A `<h>.<p>.<s>` string with a hand-built payload and a junk signature.
pub fn unsigned_token(payload: &Value) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = general_purpose::URL_SAFE_NO_PAD
        .encode(serde_json::to_vec(payload).expect("Failed to serialize payload"));
    format!("{}.{}.signature", header, body)
}
