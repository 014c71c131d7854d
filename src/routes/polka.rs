use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::WebhookCaller;
use crate::store::{Store, UserId};

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: UserId,
}

/// POST /api/polka/webhooks
///
/// Requires `Authorization: ApiKey <key>`. Only `user.upgraded` has an
/// effect; any other event is acknowledged and dropped.
pub async fn handle_webhook(
    _caller: WebhookCaller,
    payload: web::Json<WebhookEvent>,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    if payload.event != USER_UPGRADED {
        tracing::debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user = store.upgrade_user(payload.data.user_id).await?;
    tracing::info!(user_id = user.id, "User upgraded to Chirpy Red");

    Ok(HttpResponse::NoContent().finish())
}
