/// Authentication Routes
///
/// Login, access token refresh and refresh token revocation.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{login as check_credentials, TokenKind, TokenService};
use crate::error::{AppError, ErrorContext};
use crate::middleware::RefreshSession;
use crate::routes::users::CredentialsRequest;
use crate::store::{Store, UserId};

/// Login response: the user plus a fresh token pair
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub id: UserId,
    pub email: String,
    pub is_chirpy_red: bool,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// # Errors
/// - 401: unknown email or wrong password (indistinguishable)
///
/// # Security Notes
/// - Same status, code and message whether or not the email exists
pub async fn login(
    form: web::Json<CredentialsRequest>,
    store: web::Data<Store>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let (user, pair) =
        check_credentials(store.get_ref(), tokens.get_ref(), &form.email, &form.password)
            .await
            .map_err(|e| context.attach(e))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = user.id,
        "Login succeeded"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: user.id,
        email: user.email,
        is_chirpy_red: user.is_chirpy_red,
        token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Requires `Authorization: Bearer <refresh_token>`. The refresh token stays
/// valid; only a new access token is issued.
pub async fn refresh(
    session: RefreshSession,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let token = tokens.mint(TokenKind::Access, session.user_id)?;

    tracing::debug!(user_id = session.user_id, "Access token refreshed");

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Requires `Authorization: Bearer <refresh_token>`. A second revoke of the
/// same token is rejected with 401, since the token no longer verifies.
pub async fn revoke(
    session: RefreshSession,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    tokens.revoke(&session.token).await?;

    tracing::info!(user_id = session.user_id, "Refresh token revoked");

    Ok(HttpResponse::NoContent().finish())
}
