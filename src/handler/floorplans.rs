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
use validator::Validate;

use crate::{
    db::floorplandb::FloorPlanExt,
    dtos::floorplandtos::{FloorPlanDto, FloorPlanQueryDto},
    error::{db_error, HttpError},
    handler::deleted,
    middleware::auth,
    utils::pagination::Paginated,
    AppState,
};

pub fn floorplans_handler() -> Router {
    let admin = Router::new()
        .route("/", post(create_floorplan))
        .route("/:id", put(update_floorplan).delete(delete_floorplan))
        .route_layer(middleware::from_fn(auth));

    Router::new()
        .route("/", get(get_floorplans))
        .route("/filters", get(get_filter_options))
        .route("/:id", get(get_floorplan))
        .merge(admin)
}

pub async fn get_floorplans(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<FloorPlanQueryDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let pagination = query.pagination();

    let (floorplans, total) = app_state
        .db_client
        .get_floorplans(&query.filters(), pagination)
        .await
        .map_err(db_error)?;

    Ok(Json(Paginated::new(floorplans, total, pagination)))
}

pub async fn get_filter_options(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let options = app_state
        .db_client
        .get_floorplan_filter_options()
        .await
        .map_err(db_error)?;

    Ok(Json(options))
}

pub async fn get_floorplan(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(floorplan_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let floorplan = app_state
        .db_client
        .get_floorplan(floorplan_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Floor plan not found"))?;

    Ok(Json(floorplan))
}

pub async fn create_floorplan(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<FloorPlanDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let floorplan = app_state
        .db_client
        .create_floorplan(body)
        .await
        .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(floorplan)))
}

pub async fn update_floorplan(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(floorplan_id): Path<Uuid>,
    WithRejection(Json(body), _): WithRejection<Json<FloorPlanDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let floorplan = app_state
        .db_client
        .update_floorplan(floorplan_id, body)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Floor plan not found"))?;

    Ok(Json(floorplan))
}

pub async fn delete_floorplan(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(floorplan_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let removed = app_state
        .db_client
        .delete_floorplan(floorplan_id)
        .await
        .map_err(db_error)?;

    if !removed {
        return Err(HttpError::not_found("Floor plan not found"));
    }

    Ok(Json(deleted("Floor plan")))
}
