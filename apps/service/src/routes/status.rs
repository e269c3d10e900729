use actix_web::{Responder, get, web};

use super::AppState;

/// The full status table, as one JSON object keyed by target id.
///
/// Serves whatever the checker has recorded so far; a target that has never
/// completed a probe has no entry yet.
#[get("/api/status")]
pub async fn status_route(state: web::Data<AppState>) -> impl Responder {
    web::Json(state.cache.snapshot().await)
}
