/// Password Hashing and Verification
///
/// bcrypt at the library's default cost. A mismatch is a negative answer,
/// not an error; errors are reserved for bcrypt itself failing.

use bcrypt::{hash, verify, DEFAULT_COST};
use lazy_static::lazy_static;

use crate::error::{AppError, ValidationError};

/// bcrypt only looks at the first 72 bytes of its input
const MAX_PASSWORD_BYTES: usize = 72;

lazy_static! {
    // Same cost as real hashes, so checking against it takes as long
    static ref UNKNOWN_USER_HASH: Option<String> =
        hash("chirpy-unknown-user", DEFAULT_COST).ok();
}

/// Hash a password using bcrypt
///
/// # Errors
/// - Validation error for an empty password or one over 72 bytes
/// - `AppError::Hashing` if bcrypt fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    validate_password(password)?;

    hash(password, DEFAULT_COST).map_err(|e| AppError::Hashing(e.to_string()))
}

/// Verify a password against its hash
///
/// # Errors
/// `AppError::Hashing` if the stored hash is malformed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash).map_err(|e| AppError::Hashing(e.to_string()))
}

/// Spend one bcrypt verification on a login with no matching user, so an
/// unknown email costs the same time as a wrong password. The outcome is
/// discarded.
pub fn verify_unknown_user(password: &str) {
    if let Some(dummy) = UNKNOWN_USER_HASH.as_deref() {
        let _ = verify(password, dummy);
    }
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_BYTES,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "secret1";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_same_password_different_salt() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("secret1").expect("Failed to hash password");

        assert!(verify_password("secret1", &hash).expect("Failed to verify password"));
        assert!(!verify_password("secret2", &hash).expect("Failed to verify password"));
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let result = verify_password("secret1", "not-a-bcrypt-hash");
        assert!(matches!(result, Err(AppError::Hashing(_))));
    }

    #[test]
    fn test_unknown_user_hash_matches_real_cost() {
        let real = hash_password("secret1").unwrap();
        let dummy = UNKNOWN_USER_HASH.as_deref().expect("dummy hash computed");

        // "$2b$12$": same variant and cost, so the same work per verify
        assert_eq!(&dummy[..7], &real[..7]);
        assert!(!verify_password("secret1", dummy).unwrap());
        verify_unknown_user("secret1");
    }

    #[test]
    fn test_empty_password() {
        assert!(matches!(
            hash_password(""),
            Err(AppError::Validation(ValidationError::EmptyField(_)))
        ));
    }

    #[test]
    fn test_too_long_password() {
        let long_password = "a".repeat(MAX_PASSWORD_BYTES + 1);
        assert!(matches!(
            hash_password(&long_password),
            Err(AppError::Validation(ValidationError::TooLong(_, 72)))
        ));
    }
}
