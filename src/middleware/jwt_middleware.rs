/// JWT Authentication Middleware
///
/// Runs before every handler:
/// - no `Authorization: Bearer` header: the request passes through anonymous
/// - valid access token: its payload is put into request extensions
/// - malformed access token: rejected with 401
/// - expired access token: a valid `X-Refresh-Token` for the same user lets
///   the request through and the response gets a fresh access token in
///   `X-Access-Token`; anything else is rejected with 403
///
/// Routes decide for themselves whether they need a caller, see
/// `AuthenticatedUser`.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{current_timestamp, TokenIssuer, TokenKind, TokenPayload};
use crate::error::{AppError, AuthError};

pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";
pub const REISSUED_ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// What the middleware decided for one request
#[derive(Debug, PartialEq)]
pub enum AuthOutcome {
    Anonymous,
    Authenticated(TokenPayload),
    Reissued {
        payload: TokenPayload,
        access_token: String,
    },
}

/// Run the access/refresh state machine over the request headers
pub fn authenticate(headers: &HeaderMap, issuer: &TokenIssuer) -> Result<AuthOutcome, AppError> {
    let access_token = match bearer_token(headers) {
        Some(token) => token,
        None => return Ok(AuthOutcome::Anonymous),
    };

    let access = issuer.decode(access_token)?;
    match issuer.ensure_fresh(&access, TokenKind::Access, current_timestamp()) {
        Ok(()) => return Ok(AuthOutcome::Authenticated(access)),
        Err(AuthError::ExpiredAccessToken) => {
            tracing::debug!(username = %access.username, "Access token expired, trying refresh token");
        }
        Err(e) => return Err(e.into()),
    }

    let refresh_token = headers
        .get(REFRESH_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingOrInvalidRefreshToken)?;

    let refresh = issuer.verify(refresh_token, TokenKind::Refresh)?;
    if refresh.username != access.username {
        tracing::warn!(
            access_username = %access.username,
            refresh_username = %refresh.username,
            "Refresh token belongs to another user"
        );
        return Err(AuthError::MissingOrInvalidRefreshToken.into());
    }

    let payload = TokenPayload::new(refresh.username);
    let access_token = issuer.sign(&payload)?;
    Ok(AuthOutcome::Reissued {
        payload,
        access_token,
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// JWT middleware, applied to the whole application
pub struct JwtMiddleware {
    issuer: TokenIssuer,
}

impl JwtMiddleware {
    pub fn new(issuer: TokenIssuer) -> Self {
        Self { issuer }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            issuer: self.issuer.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    issuer: TokenIssuer,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = authenticate(req.headers(), &self.issuer);
        let service = self.service.clone();

        Box::pin(async move {
            match outcome? {
                AuthOutcome::Anonymous => service.call(req).await,
                AuthOutcome::Authenticated(payload) => {
                    tracing::debug!(username = %payload.username, "JWT validated successfully");
                    req.extensions_mut().insert(payload);
                    service.call(req).await
                }
                AuthOutcome::Reissued {
                    payload,
                    access_token,
                } => {
                    tracing::info!(username = %payload.username, "Access token reissued from refresh token");
                    req.extensions_mut().insert(payload);

                    // Handler runs first, the new token only decorates its response
                    let mut res = service.call(req).await?;
                    let value = HeaderValue::from_str(&access_token)
                        .map_err(|e| AppError::Internal(format!("Unusable token header: {}", e)))?;
                    res.headers_mut()
                        .insert(HeaderName::from_static(REISSUED_ACCESS_TOKEN_HEADER), value);
                    Ok(res)
                }
            }
        })
    }
}
