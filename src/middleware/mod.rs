/// Middleware module
///
/// JWT authentication with silent refresh, and the extractor handlers use
/// to require an authenticated caller.

mod authenticated_user;
mod jwt_middleware;

pub use authenticated_user::AuthenticatedUser;
pub use jwt_middleware::authenticate;
pub use jwt_middleware::AuthOutcome;
pub use jwt_middleware::JwtMiddleware;
pub use jwt_middleware::REFRESH_TOKEN_HEADER;
pub use jwt_middleware::REISSUED_ACCESS_TOKEN_HEADER;
