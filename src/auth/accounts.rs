/// Account flows built from the store, password hashing and token service.

use crate::auth::jwt::{TokenPair, TokenService};
use crate::auth::password::{hash_password, verify_password, verify_unknown_user};
use crate::error::{AppError, AuthError, StoreError};
use crate::store::{Store, User, UserId};
use crate::validators::is_valid_email;

/// Create a user with a hashed password.
///
/// # Errors
/// - Validation error for a malformed email or unusable password
/// - `StoreError::DuplicateEmail` if the email is taken
pub async fn register(store: &Store, email: &str, password: &str) -> Result<User, AppError> {
    let email = is_valid_email(email)?;
    let password_hash = hash_password(password)?;

    let user = store.create_user(&email, &password_hash).await?;
    tracing::info!(user_id = user.id, "User registered");
    Ok(user)
}

/// Replace a user's email and password.
pub async fn update_credentials(
    store: &Store,
    user_id: UserId,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let email = is_valid_email(email)?;
    let password_hash = hash_password(password)?;

    let user = store.update_user(user_id, &email, &password_hash).await?;
    tracing::info!(user_id = user.id, "User credentials updated");
    Ok(user)
}

/// Check credentials and issue a token pair.
///
/// An unknown email and a wrong password produce the same
/// `InvalidCredentials` error, and both run one bcrypt verification.
pub async fn login(
    store: &Store,
    tokens: &TokenService,
    email: &str,
    password: &str,
) -> Result<(User, TokenPair), AppError> {
    let user = match store.get_user_by_email(email.trim()).await {
        Ok(user) => user,
        Err(StoreError::NotFound(_)) => {
            verify_unknown_user(password);
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(e) => return Err(e.into()),
    };

    if !verify_password(password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let pair = tokens.issue_pair(user.id).await?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok((user, pair))
}
