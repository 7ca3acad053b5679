use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::serviceareadb::ServiceAreaExt,
    dtos::serviceareadtos::ServiceAreaDto,
    error::{db_error, HttpError},
    handler::deleted,
    middleware::auth,
    AppState,
};

pub fn service_areas_handler() -> Router {
    let admin = Router::new()
        .route("/all", get(get_all_service_areas))
        .route("/", post(create_service_area))
        .route("/:id", put(update_service_area).delete(delete_service_area))
        .route_layer(middleware::from_fn(auth));

    Router::new()
        .route("/", get(get_active_service_areas))
        .merge(admin)
}

pub async fn get_active_service_areas(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let areas = app_state
        .db_client
        .get_service_areas(true)
        .await
        .map_err(db_error)?;

    Ok(Json(areas))
}

pub async fn get_all_service_areas(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let areas = app_state
        .db_client
        .get_service_areas(false)
        .await
        .map_err(db_error)?;

    Ok(Json(areas))
}

pub async fn create_service_area(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<ServiceAreaDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let area = app_state
        .db_client
        .create_service_area(body)
        .await
        .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(area)))
}

pub async fn update_service_area(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(area_id): Path<Uuid>,
    WithRejection(Json(body), _): WithRejection<Json<ServiceAreaDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let area = app_state
        .db_client
        .update_service_area(area_id, body)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Service area not found"))?;

    Ok(Json(area))
}

pub async fn delete_service_area(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(area_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let removed = app_state
        .db_client
        .delete_service_area(area_id)
        .await
        .map_err(db_error)?;

    if !removed {
        return Err(HttpError::not_found("Service area not found"));
    }

    Ok(Json(deleted("Service area")))
}
