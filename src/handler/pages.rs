use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    db::pagedb::PageExt,
    dtos::pagedtos::{is_valid_slug, UpsertPageDto},
    error::{db_error, HttpError},
    handler::deleted,
    middleware::auth,
    AppState,
};

pub fn pages_handler() -> Router {
    let admin = Router::new()
        .route("/", get(get_pages))
        .route("/:slug", put(upsert_page).delete(delete_page))
        .route_layer(middleware::from_fn(auth));

    Router::new()
        .route("/:slug", get(get_page))
        .merge(admin)
}

fn checked_slug(slug: &str) -> Result<&str, HttpError> {
    if is_valid_slug(slug) {
        Ok(slug)
    } else {
        Err(HttpError::bad_request(
            "Slug may only contain lowercase letters, digits, '-' and '_'",
        ))
    }
}

pub async fn get_page(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let page = app_state
        .db_client
        .get_page(checked_slug(&slug)?)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Page not found"))?;

    Ok(Json(page))
}

pub async fn get_pages(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let pages = app_state.db_client.get_pages().await.map_err(db_error)?;
    Ok(Json(pages))
}

pub async fn upsert_page(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
    WithRejection(Json(body), _): WithRejection<Json<UpsertPageDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = app_state
        .db_client
        .upsert_page(checked_slug(&slug)?, body)
        .await
        .map_err(db_error)?;

    Ok(Json(page))
}

pub async fn delete_page(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let removed = app_state
        .db_client
        .delete_page(checked_slug(&slug)?)
        .await
        .map_err(db_error)?;

    if !removed {
        return Err(HttpError::not_found("Page not found"));
    }

    Ok(Json(deleted("Page")))
}
