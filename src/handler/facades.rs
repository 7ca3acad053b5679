use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    db::facadedb::FacadeExt,
    dtos::facadedtos::{FacadeDto, FacadeQueryDto},
    error::{db_error, HttpError},
    handler::deleted,
    middleware::auth,
    utils::pagination::Paginated,
    AppState,
};

pub fn facades_handler() -> Router {
    let admin = Router::new()
        .route("/", post(create_facade))
        .route("/:id", put(update_facade).delete(delete_facade))
        .route_layer(middleware::from_fn(auth));

    Router::new()
        .route("/", get(get_facades))
        .route("/:id", get(get_facade))
        .merge(admin)
}

pub async fn get_facades(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<FacadeQueryDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let pagination = query.pagination();

    let (facades, total) = app_state
        .db_client
        .get_facades(&query.filters(), pagination)
        .await
        .map_err(db_error)?;

    Ok(Json(Paginated::new(facades, total, pagination)))
}

pub async fn get_facade(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(facade_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let facade = app_state
        .db_client
        .get_facade(facade_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Facade not found"))?;

    Ok(Json(facade))
}

pub async fn create_facade(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<FacadeDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate_all()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let facade = app_state
        .db_client
        .create_facade(body)
        .await
        .map_err(db_error)?;

    tracing::info!(
        "Facade {} created with {} floor plans and {} variants",
        facade.facade.id,
        facade.floorplans.len(),
        facade.variants.len()
    );
    Ok((StatusCode::CREATED, Json(facade)))
}

pub async fn update_facade(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(facade_id): Path<Uuid>,
    WithRejection(Json(body), _): WithRejection<Json<FacadeDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate_all()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let facade = app_state
        .db_client
        .update_facade(facade_id, body)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Facade not found"))?;

    Ok(Json(facade))
}

pub async fn delete_facade(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(facade_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let removed = app_state
        .db_client
        .delete_facade(facade_id)
        .await
        .map_err(db_error)?;

    if !removed {
        return Err(HttpError::not_found("Facade not found"));
    }

    Ok(Json(deleted("Facade")))
}
