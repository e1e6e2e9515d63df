/// JWT encoding and decoding
///
/// Pure functions over a payload and a shared secret. Expiry is not
/// checked here; see `claims::is_valid`.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{TokenPayload, ISSUER};
use crate::error::{AppError, AuthError};

pub const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Sign `payload` into a `header.payload.signature` string
///
/// # Errors
/// Returns an internal error if serialization or signing fails
pub fn encode_token(payload: &TokenPayload, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::new(JWT_ALGORITHM),
        payload,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Verify the signature of `token` and return its payload
///
/// # Errors
/// `AuthError::MalformedToken` on any structural problem, signature
/// mismatch, algorithm mismatch or foreign issuer
pub fn decode_token(token: &str, secret: &str) -> Result<TokenPayload, AuthError> {
    decode::<TokenPayload>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT decode error: {}", e);
        AuthError::MalformedToken
    })
}

fn validation() -> Validation {
    let mut validation = Validation::new(JWT_ALGORITHM);
    // Lifetime is derived from `isa`, there is no `exp` claim to require
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    validation.set_issuer(&[ISSUER]);
    validation
}
