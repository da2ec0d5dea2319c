use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::role::Role;

/// Claim names checked for the role, in priority order.
pub const ROLE_KEYS: &[&str] = &["role"];

/// Claim names checked for the subject id, in priority order.
///
/// The identity, NGO and matching services disagree on naming, so every
/// variant seen in issued tokens is accepted.
pub const SUBJECT_ID_KEYS: &[&str] = &["userId", "user_id", "sub", "id"];

/// Claim names checked for the expiry timestamp (epoch seconds).
pub const EXPIRY_KEYS: &[&str] = &["exp"];

pub const EMAIL_KEYS: &[&str] = &["email"];

/// Unverified view of an access token's payload segment.
///
/// Never cached: derive a fresh one from the stored token on every use.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new(payload: Map<String, Value>) -> Self {
        Claims(payload)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the first usable value among `keys`.
    ///
    /// Nulls, booleans and blank strings are skipped; numbers always count.
    pub fn first_present(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| match value {
                Value::String(s) => !s.trim().is_empty(),
                Value::Number(_) => true,
                _ => false,
            })
    }

    pub fn raw_role(&self) -> Option<&str> {
        self.first_present(ROLE_KEYS).and_then(Value::as_str)
    }

    pub fn role(&self) -> Role {
        Role::from_claim(self.raw_role())
    }

    pub fn subject_id(&self) -> Option<String> {
        self.first_present(SUBJECT_ID_KEYS).map(value_to_string)
    }

    pub fn email(&self) -> Option<String> {
        self.first_present(EMAIL_KEYS).map(value_to_string)
    }

    /// Expiry as epoch seconds. Numeric strings are accepted as well.
    pub fn expires_at_epoch(&self) -> Option<i64> {
        match self.first_present(EXPIRY_KEYS)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at_epoch()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    /// True only when an expiry is present and lies strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at_epoch() {
            Some(exp) => exp < now.timestamp(),
            None => false,
        }
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(payload: Map<String, Value>) -> Self {
        Claims(payload)
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
