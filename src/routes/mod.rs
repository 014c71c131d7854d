mod admin;
mod auth;
mod chirps;
mod health_check;
mod polka;
mod users;

pub use admin::{metrics, reset};
pub use auth::{login, refresh, revoke, LoginResponse, RefreshResponse};
pub use chirps::{create_chirp, delete_chirp, get_chirp, list_chirps, SortOrder};
pub use health_check::health_check;
pub use polka::handle_webhook;
pub use users::{create_user, delete_user, update_user, UserResponse};
