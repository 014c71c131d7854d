/// Authorization extractors
///
/// Parses the `Authorization` header and resolves it to an identity before
/// the handler runs. Handlers take one of these as an argument instead of
/// reading headers themselves.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::auth::{TokenKind, TokenService};
use crate::configuration::PolkaSettings;
use crate::error::{AppError, AuthError};
use crate::store::UserId;

const BEARER_SCHEME: &str = "Bearer";
const API_KEY_SCHEME: &str = "ApiKey";

/// Pull the token out of `Bearer <token>`.
///
/// # Errors
/// - `MissingHeader` if the header is absent or empty
/// - `MalformedHeader` unless it is exactly `Bearer` and one non-empty field
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    extract_credential(header, BEARER_SCHEME)
}

/// Pull the key out of `ApiKey <key>`. Same rules as [`extract_bearer`].
pub fn extract_api_key(header: Option<&str>) -> Result<&str, AuthError> {
    extract_credential(header, API_KEY_SCHEME)
}

fn extract_credential<'a>(header: Option<&'a str>, scheme: &str) -> Result<&'a str, AuthError> {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => return Err(AuthError::MissingHeader),
    };

    let mut fields = header.split(' ');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(s), Some(credential), None) if s == scheme && !credential.is_empty() => {
            Ok(credential)
        }
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Compare API keys in constant time. Hashing first makes the comparison
/// length-independent as well.
pub fn api_key_matches(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    presented.ct_eq(&expected).into()
}

/// Raw `Authorization` header. A value that is not visible ASCII counts as
/// malformed rather than missing.
fn authorization_header(req: &HttpRequest) -> Result<Option<String>, AuthError> {
    match req.headers().get(header::AUTHORIZATION) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|s| Some(s.to_string()))
            .map_err(|_| AuthError::MalformedHeader),
    }
}

fn token_service(req: &HttpRequest) -> Result<web::Data<TokenService>, AppError> {
    req.app_data::<web::Data<TokenService>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("TokenService is not registered".to_string()))
}

/// Caller holding a valid access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub id: UserId,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let header = authorization_header(req);
        let tokens = token_service(req);

        Box::pin(async move {
            let header = header?;
            let token = extract_bearer(header.as_deref())?;
            let id = tokens?.verify_user(token, TokenKind::Access).await?;

            tracing::debug!(user_id = id, "Access token accepted");
            Ok(AuthenticatedUser { id })
        })
    }
}

/// Caller holding a valid, unrevoked refresh token.
#[derive(Debug, Clone)]
pub struct RefreshSession {
    pub token: String,
    pub user_id: UserId,
}

impl FromRequest for RefreshSession {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let header = authorization_header(req);
        let tokens = token_service(req);

        Box::pin(async move {
            let header = header?;
            let token = extract_bearer(header.as_deref())?;
            let user_id = tokens?.verify_user(token, TokenKind::Refresh).await?;

            Ok(RefreshSession {
                token: token.to_string(),
                user_id,
            })
        })
    }
}

/// The payment provider, identified by the shared API key.
#[derive(Debug, Clone, Copy)]
pub struct WebhookCaller;

impl FromRequest for WebhookCaller {
    type Error = AppError;
    type Future = std::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        std::future::ready(authenticate_webhook(req))
    }
}

fn authenticate_webhook(req: &HttpRequest) -> Result<WebhookCaller, AppError> {
    let polka = req
        .app_data::<web::Data<PolkaSettings>>()
        .ok_or_else(|| AppError::Internal("PolkaSettings is not registered".to_string()))?;

    let header = authorization_header(req)?;
    let key = extract_api_key(header.as_deref())?;

    if !api_key_matches(key, &polka.api_key) {
        tracing::warn!("Webhook call with wrong API key");
        return Err(AuthError::InvalidApiKey.into());
    }

    Ok(WebhookCaller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(Some("Bearer abc123")), Ok("abc123"));
    }

    #[test]
    fn test_extract_bearer_missing() {
        assert_eq!(extract_bearer(None), Err(AuthError::MissingHeader));
        assert_eq!(extract_bearer(Some("")), Err(AuthError::MissingHeader));
    }

    #[test]
    fn test_extract_bearer_malformed() {
        assert_eq!(extract_bearer(Some("Bearer")), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer(Some("Basic xyz")), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer(Some("Bearer a b")), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer(Some("Bearer ")), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer(Some("bearer abc123")), Err(AuthError::MalformedHeader));
    }

    #[test]
    fn test_extract_api_key() {
        assert_eq!(extract_api_key(Some("ApiKey f271c81f")), Ok("f271c81f"));
        assert_eq!(extract_api_key(Some("Bearer f271c81f")), Err(AuthError::MalformedHeader));
        assert_eq!(extract_api_key(None), Err(AuthError::MissingHeader));
    }

    #[test]
    fn test_api_key_matches() {
        assert!(api_key_matches("f271c81f", "f271c81f"));
        assert!(!api_key_matches("f271c81e", "f271c81f"));
        assert!(!api_key_matches("f271c81", "f271c81f"));
        assert!(!api_key_matches("", "f271c81f"));
    }

    #[test]
    fn test_webhook_caller_checks_key() {
        let polka = web::Data::new(PolkaSettings {
            api_key: "f271c81f".to_string(),
        });

        let ok = TestRequest::default()
            .app_data(polka.clone())
            .insert_header((header::AUTHORIZATION, "ApiKey f271c81f"))
            .to_http_request();
        assert!(authenticate_webhook(&ok).is_ok());

        let wrong = TestRequest::default()
            .app_data(polka.clone())
            .insert_header((header::AUTHORIZATION, "ApiKey nope"))
            .to_http_request();
        assert!(matches!(
            authenticate_webhook(&wrong),
            Err(AppError::Auth(AuthError::InvalidApiKey))
        ));

        let missing = TestRequest::default().app_data(polka).to_http_request();
        assert!(matches!(
            authenticate_webhook(&missing),
            Err(AppError::Auth(AuthError::MissingHeader))
        ));
    }
}
