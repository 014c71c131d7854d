/// JWT Token Generation and Validation
///
/// Access and refresh tokens are both HS256 JWTs signed with the server
/// secret. Verification runs in a fixed order: signature, expiry, issuer
/// (token kind), and for refresh tokens the revocation record in the store.

use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{Claims, TokenKind};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::store::{Store, UserId};

/// Tokens handed out on login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign claims with the shared secret.
pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Check signature, expiry and kind of a token without consulting the store.
///
/// # Errors
/// - `InvalidSignature` if the token was not signed with `secret`
/// - `Expired` once `exp` has passed (no leeway)
/// - `WrongTokenType` if the issuer tag is not `expected`'s
/// - `InvalidToken` for anything that does not decode into complete claims
pub fn decode_token(token: &str, expected: TokenKind, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let claims = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("JWT validation error: {}", e);
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken,
            }
        })?;

    if claims.kind() != Some(expected) {
        return Err(AuthError::WrongTokenType);
    }

    Ok(claims)
}

/// Mints and verifies tokens. Holds the store for refresh token bookkeeping.
#[derive(Clone)]
pub struct TokenService {
    settings: JwtSettings,
    store: Store,
}

impl TokenService {
    pub fn new(settings: JwtSettings, store: Store) -> Self {
        Self { settings, store }
    }

    /// Lifetime in seconds of tokens of `kind`.
    pub fn expiry(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.settings.access_token_expiry,
            TokenKind::Refresh => self.settings.refresh_token_expiry,
        }
    }

    pub fn mint(&self, kind: TokenKind, user_id: UserId) -> Result<String, AppError> {
        let claims = Claims::new(kind, user_id, self.expiry(kind));
        encode_token(&claims, &self.settings.secret)
    }

    /// Verify `token` as `expected` and return its subject.
    ///
    /// Refresh tokens are also checked against the store. A refresh token
    /// with no record at all is accepted as long as signature, expiry and
    /// kind check out.
    pub async fn verify(&self, token: &str, expected: TokenKind) -> Result<String, AppError> {
        let claims = decode_token(token, expected, &self.settings.secret)?;

        if expected == TokenKind::Refresh && self.store.is_refresh_token_revoked(token).await? {
            tracing::warn!(user_id = %claims.sub, "Attempt to use revoked refresh token");
            return Err(AuthError::RevokedToken.into());
        }

        Ok(claims.sub)
    }

    /// `verify`, with the subject parsed as a user id.
    pub async fn verify_user(&self, token: &str, expected: TokenKind) -> Result<UserId, AppError> {
        let subject = self.verify(token, expected).await?;
        subject
            .parse()
            .map_err(|_| AppError::Auth(AuthError::InvalidToken))
    }

    /// Mint an access/refresh pair and record the refresh token.
    pub async fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, AppError> {
        let access_token = self.mint(TokenKind::Access, user_id)?;
        let refresh_token = self.mint(TokenKind::Refresh, user_id)?;

        self.store.add_refresh_token(&refresh_token).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        self.store.revoke_refresh_token(refresh_token).await?;
        Ok(())
    }
}
