/// Token payload and expiry policy
///
/// The payload holds who the token is for, when it was
/// issued and who issued it. It carries no `exp` claim, expiry is computed
/// from `isa` and the max age configured for the token kind.

use serde::{Deserialize, Serialize};

/// Fixed identifier of the issuing service, embedded in every token
pub const ISSUER: &str = "oz-coding";

/// Claims signed into access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenPayload {
    pub username: String,
    /// Issued at, seconds since the Unix epoch (fractional)
    #[serde(rename = "isa")]
    pub issued_at: f64,
    #[serde(rename = "iss")]
    pub issuer: String,
}

impl TokenPayload {
    /// Payload for `username` stamped with the current time
    pub fn new(username: impl Into<String>) -> Self {
        Self::issued_at(username, current_timestamp())
    }

    pub fn issued_at(username: impl Into<String>, issued_at: f64) -> Self {
        Self {
            username: username.into(),
            issued_at,
            issuer: ISSUER.to_string(),
        }
    }
}

/// Current time in the same unit as `TokenPayload::issued_at`
pub fn current_timestamp() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// A token is valid strictly before `issued_at + max_age_seconds`
pub fn is_valid(payload: &TokenPayload, now: f64, max_age_seconds: i64) -> bool {
    now < payload.issued_at + max_age_seconds as f64
}
