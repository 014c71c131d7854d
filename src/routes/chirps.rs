use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::{AppError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::store::{ChirpId, Store, UserId};
use crate::validators::clean_chirp_body;

#[derive(Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub author_id: Option<UserId>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// POST /api/chirps
pub async fn create_chirp(
    caller: AuthenticatedUser,
    form: web::Json<ChirpRequest>,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let body = clean_chirp_body(&form.body)?;
    let chirp = store.create_chirp(caller.id, &body).await?;

    tracing::info!(chirp_id = chirp.id, author_id = caller.id, "Chirp created");

    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps?author_id=&sort=asc|desc
///
/// Ordered by id; `sort=desc` reverses.
pub async fn list_chirps(
    query: web::Query<ListQuery>,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let mut chirps = store.list_chirps(query.author_id).await?;

    if query.sort == SortOrder::Desc {
        chirps.reverse();
    }

    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{id}
pub async fn get_chirp(
    path: web::Path<ChirpId>,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let chirp = store.get_chirp(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{id}
///
/// # Errors
/// - 403: caller is not the author
/// - 404: no such chirp
pub async fn delete_chirp(
    caller: AuthenticatedUser,
    path: web::Path<ChirpId>,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_deletion").with_user_id(caller.id);
    let chirp_id = path.into_inner();

    store
        .delete_chirp(chirp_id, caller.id)
        .await
        .map_err(|e| context.attach(e))?;

    tracing::info!(
        request_id = %context.request_id,
        chirp_id,
        user_id = ?context.user_id,
        "Chirp deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
