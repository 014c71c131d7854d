/// Middleware module
///
/// Authorization extractors and the file server hit counter.

mod extractors;
mod metrics;

pub use extractors::{api_key_matches, extract_api_key, extract_bearer};
pub use extractors::{AuthenticatedUser, RefreshSession, WebhookCaller};
pub use metrics::{CountHits, HitCounter};
