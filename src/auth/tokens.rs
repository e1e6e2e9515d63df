/// Access and refresh token issuance
///
/// Both kinds carry the same payload and are signed with the same secret.
/// They differ only in the max age applied on verification and in the
/// header that transports them.

use serde::Serialize;

use crate::auth::claims::{current_timestamp, is_valid, TokenPayload};
use crate::auth::jwt::{decode_token, encode_token};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Tokens handed out at sign-in
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Stateless token service built once from `JwtSettings`
#[derive(Clone)]
pub struct TokenIssuer {
    settings: JwtSettings,
}

impl TokenIssuer {
    pub fn new(settings: JwtSettings) -> Self {
        Self { settings }
    }

    pub fn issue_access(&self, username: &str) -> Result<String, AppError> {
        self.sign(&TokenPayload::new(username))
    }

    pub fn issue_refresh(&self, username: &str) -> Result<String, AppError> {
        self.sign(&TokenPayload::new(username))
    }

    pub fn sign(&self, payload: &TokenPayload) -> Result<String, AppError> {
        encode_token(payload, &self.settings.secret)
    }

    /// Signature and issuer check only, no expiry
    pub fn decode(&self, token: &str) -> Result<TokenPayload, AuthError> {
        decode_token(token, &self.settings.secret)
    }

    pub fn is_fresh(&self, payload: &TokenPayload, kind: TokenKind, now: f64) -> bool {
        is_valid(payload, now, self.max_age(kind))
    }

    pub fn issue_pair(&self, username: &str) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.issue_access(username)?,
            refresh_token: self.issue_refresh(username)?,
        })
    }

    pub fn max_age(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.settings.access_token_expiry,
            TokenKind::Refresh => self.settings.refresh_token_expiry,
        }
    }

    /// Decode `token` and check it against the max age of `kind`
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenPayload, AuthError> {
        self.verify_at(token, kind, current_timestamp())
    }

    /// Errors per kind:
    /// - access: `MalformedToken` or `ExpiredAccessToken`
    /// - refresh: always `MissingOrInvalidRefreshToken`
    pub fn verify_at(
        &self,
        token: &str,
        kind: TokenKind,
        now: f64,
    ) -> Result<TokenPayload, AuthError> {
        let payload = match self.decode(token) {
            Ok(payload) => payload,
            Err(_) if kind == TokenKind::Refresh => {
                return Err(AuthError::MissingOrInvalidRefreshToken)
            }
            Err(e) => return Err(e),
        };

        self.ensure_fresh(&payload, kind, now)?;
        Ok(payload)
    }

    /// Expiry check for an already decoded payload
    ///
    /// Fails with `ExpiredAccessToken` or `MissingOrInvalidRefreshToken`
    /// depending on `kind`.
    pub fn ensure_fresh(
        &self,
        payload: &TokenPayload,
        kind: TokenKind,
        now: f64,
    ) -> Result<(), AuthError> {
        if self.is_fresh(payload, kind, now) {
            return Ok(());
        }

        match kind {
            TokenKind::Access => Err(AuthError::ExpiredAccessToken),
            TokenKind::Refresh => Err(AuthError::MissingOrInvalidRefreshToken),
        }
    }
}
