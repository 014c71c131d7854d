/// JWT Claims structure
///
/// Both token kinds share one claims record. The kind is carried in the
/// issuer claim, so a refresh token can never pass where an access token is
/// expected and vice versa.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;
use crate::store::UserId;

pub const ACCESS_ISSUER: &str = "chirpy-access";
pub const REFRESH_ISSUER: &str = "chirpy-refresh";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived, never persisted
    Access,
    /// Long-lived, persisted and revocable
    Refresh,
}

impl TokenKind {
    pub fn issuer(self) -> &'static str {
        match self {
            TokenKind::Access => ACCESS_ISSUER,
            TokenKind::Refresh => REFRESH_ISSUER,
        }
    }

    pub fn from_issuer(issuer: &str) -> Option<Self> {
        match issuer {
            ACCESS_ISSUER => Some(TokenKind::Access),
            REFRESH_ISSUER => Some(TokenKind::Refresh),
            _ => None,
        }
    }
}

/// All fields are required; a token missing any of them does not decode.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Issuer, one of the kind tags
    pub iss: String,
    /// Subject (user id as a decimal string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token id, keeps same-second tokens for one user distinct
    pub jti: String,
}

impl Claims {
    pub fn new(kind: TokenKind, user_id: UserId, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            iss: kind.issuer().to_string(),
            sub: user_id.to_string(),
            iat: now,
            exp: now + expiry_seconds,
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn kind(&self) -> Option<TokenKind> {
        TokenKind::from_issuer(&self.iss)
    }

    /// Numeric user id carried in the subject.
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(TokenKind::Access, 7, 3600);

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.iss, ACCESS_ISSUER);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.kind(), Some(TokenKind::Access));
    }

    #[test]
    fn test_issuer_tags_are_distinct() {
        assert_ne!(TokenKind::Access.issuer(), TokenKind::Refresh.issuer());
        assert_eq!(TokenKind::from_issuer("chirpy-refresh"), Some(TokenKind::Refresh));
        assert_eq!(TokenKind::from_issuer("someone-else"), None);
    }

    #[test]
    fn test_user_id_extraction() {
        let claims = Claims::new(TokenKind::Refresh, 42, 60);
        assert_eq!(claims.user_id().unwrap(), 42);
    }

    #[test]
    fn test_invalid_user_id() {
        let mut claims = Claims::new(TokenKind::Access, 1, 60);
        claims.sub = "not-a-number".to_string();

        assert_eq!(claims.user_id(), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_same_second_tokens_differ() {
        let a = Claims::new(TokenKind::Refresh, 1, 60);
        let b = Claims::new(TokenKind::Refresh, 1, 60);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_missing_claim_is_rejected() {
        let raw = r#"{"iss":"chirpy-access","sub":"1","iat":0,"exp":10}"#;
        assert!(serde_json::from_str::<Claims>(raw).is_err());
    }
}
