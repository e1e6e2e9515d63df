use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::TokenPayload;
use crate::error::{AppError, AuthError};

/// Caller identity placed in request extensions by `JwtMiddleware`
///
/// Extracting it fails with 401 when the request came in without a token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenPayload);

impl AuthenticatedUser {
    pub fn username(&self) -> &str {
        &self.0.username
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<TokenPayload>()
                .cloned()
                .map(AuthenticatedUser)
                .ok_or(AppError::Auth(AuthError::MissingToken)),
        )
    }
}
