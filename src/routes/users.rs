/// User Routes
///
/// Registration and self-service account management.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{register, update_credentials};
use crate::error::{AppError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::store::{Store, User, UserId};

/// Email and password, used for registration, updates and login
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user; never carries the password hash
#[derive(Serialize, Deserialize, Debug)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: malformed email or empty password
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let user = register(store.get_ref(), &form.email, &form.password)
        .await
        .map_err(|e| context.attach(e))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = user.id,
        "User created"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PUT /api/users
///
/// Replace the caller's own email and password.
pub async fn update_user(
    caller: AuthenticatedUser,
    form: web::Json<CredentialsRequest>,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let user = update_credentials(store.get_ref(), caller.id, &form.email, &form.password).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// DELETE /api/users
pub async fn delete_user(
    caller: AuthenticatedUser,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_deletion").with_user_id(caller.id);

    store
        .delete_user(caller.id)
        .await
        .map_err(|e| context.attach(e))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = ?context.user_id,
        "User deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
