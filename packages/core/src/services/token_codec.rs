use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;

use crate::models::claims::Claims;
use crate::services::errors::token_codec_errors::DecodeError;

/// Reads the claims of a compact `header.payload.signature` token.
///
/// The signature is not checked; the issuing service is the only party that
/// can and does verify it.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    let mut segments = token.trim().split('.');
    let payload = match (segments.next(), segments.next()) {
        (Some(_), Some(payload)) => payload,
        _ => return Err(DecodeError::TooFewSegments),
    };

    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(normalize_base64(payload))
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(Claims::new(map)),
        Ok(_) => Err(DecodeError::NotAnObject),
        Err(e) => Err(DecodeError::InvalidJson(e.to_string())),
    }
}

// Some issuers pad the segment or use the standard alphabet.
fn normalize_base64(segment: &str) -> String {
    segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect()
}
