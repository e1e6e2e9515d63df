/// Account Routes
///
/// Sign-up, sign-in and the caller's own profile. Routes taking an
/// `AuthenticatedUser` need a valid (or silently refreshed) access token.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::Credential;
use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::UserService;

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

/// Body of `PATCH /users/me`; a missing password leaves the account as is
#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub created_at: String,
}

impl From<&Credential> for UserResponse {
    fn from(user: &Credential) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// POST /users/sign-up
///
/// # Errors
/// - 400: empty or too long username/password
/// - 409: username already registered
pub async fn sign_up(
    body: web::Json<SignUpRequest>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users.create_user(&body.username, &body.password).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// POST /users/sign-in
///
/// Returns `{access_token, refresh_token}`.
///
/// # Errors
/// - 404: unknown username
/// - 401: wrong password
pub async fn sign_in(
    body: web::Json<SignInRequest>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let tokens = users.authenticate(&body.username, &body.password).await?;

    tracing::info!(username = %body.username.trim(), "User signed in");
    Ok(HttpResponse::Ok().json(tokens))
}

/// GET /users
pub async fn list_users(users: web::Data<UserService>) -> Result<HttpResponse, AppError> {
    let all = users.list_users().await?;
    let body: Vec<UserResponse> = all.iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /users/{user_id}
pub async fn get_user(
    path: web::Path<i64>,
    _caller: AuthenticatedUser,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users.get_user_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// GET /users/me
pub async fn get_me(
    caller: AuthenticatedUser,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = users.get_user_by_username(caller.username()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// PATCH /users/me
pub async fn update_me(
    body: web::Json<UpdateMeRequest>,
    caller: AuthenticatedUser,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = match &body.password {
        Some(password) => users.update_password(caller.username(), password).await?,
        None => users.get_user_by_username(caller.username()).await?,
    };
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// DELETE /users/me
pub async fn delete_me(
    caller: AuthenticatedUser,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    users.delete_user(caller.username()).await?;
    Ok(HttpResponse::NoContent().finish())
}
