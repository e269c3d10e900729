use actix_web::{HttpResponse, delete, get, post, put, web};
use url::Url;

use super::AppState;
use crate::database::models::TargetDraft;
use crate::error::ApiError;

fn validate(draft: &TargetDraft) -> Result<(), ApiError> {
    if draft.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".into()));
    }

    if Url::parse(&draft.url).is_err() {
        return Err(ApiError::BadRequest(format!("invalid url: {}", draft.url)));
    }

    Ok(())
}

#[get("/api/targets")]
pub async fn list_targets_route(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let targets = state.store.list_targets().await?;

    Ok(HttpResponse::Ok().json(targets))
}

#[post("/api/targets")]
pub async fn create_target_route(
    state: web::Data<AppState>,
    draft: web::Json<TargetDraft>,
) -> Result<HttpResponse, ApiError> {
    validate(&draft)?;
    let created = state.store.create_target(&draft).await?;

    Ok(HttpResponse::Created().json(created))
}

#[put("/api/targets/{id}")]
pub async fn update_target_route(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    draft: web::Json<TargetDraft>,
) -> Result<HttpResponse, ApiError> {
    validate(&draft)?;

    match state.store.update_target(id.into_inner(), &draft).await? {
        Some(updated) => Ok(HttpResponse::Ok().json(updated)),
        None => Err(ApiError::NotFound),
    }
}

#[delete("/api/targets/{id}")]
pub async fn delete_target_route(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    if state.store.delete_target(id.into_inner()).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(ApiError::NotFound)
    }
}
