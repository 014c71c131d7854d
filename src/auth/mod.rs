/// Authentication module
///
/// Handles JWT minting/verification, password hashing, and the account
/// flows that tie them to the store.

mod accounts;
mod claims;
mod jwt;
mod password;

pub use accounts::login;
pub use accounts::register;
pub use accounts::update_credentials;
pub use claims::Claims;
pub use claims::TokenKind;
pub use claims::{ACCESS_ISSUER, REFRESH_ISSUER};
pub use jwt::decode_token;
pub use jwt::encode_token;
pub use jwt::TokenPair;
pub use jwt::TokenService;
pub use password::hash_password;
pub use password::verify_password;
