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
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::upgradedb::UpgradeExt,
    dtos::upgradedtos::{UpgradeCategoryDto, UpgradeDto, UpgradeGroupDto},
    error::{db_error, HttpError},
    handler::deleted,
    middleware::auth,
    AppState,
};

pub fn upgrades_handler() -> Router {
    let admin = Router::new()
        .route("/catalog/all", get(get_full_catalog))
        .route("/groups", post(create_group))
        .route("/groups/:id", put(update_group).delete(delete_group))
        .route("/categories", post(create_category))
        .route("/categories/:id", put(update_category).delete(delete_category))
        .route("/items", post(create_upgrade))
        .route("/items/:id", put(update_upgrade).delete(delete_upgrade))
        .route_layer(middleware::from_fn(auth));

    Router::new()
        .route("/catalog", get(get_catalog))
        .merge(admin)
}

pub async fn get_catalog(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let catalog = app_state
        .db_client
        .get_upgrade_catalog(true)
        .await
        .map_err(db_error)?;

    Ok(Json(catalog))
}

pub async fn get_full_catalog(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let catalog = app_state
        .db_client
        .get_upgrade_catalog(false)
        .await
        .map_err(db_error)?;

    Ok(Json(catalog))
}

pub async fn create_group(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<UpgradeGroupDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let group = app_state
        .db_client
        .create_upgrade_group(body)
        .await
        .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn update_group(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
    WithRejection(Json(body), _): WithRejection<Json<UpgradeGroupDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let group = app_state
        .db_client
        .update_upgrade_group(group_id, body)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Upgrade group not found"))?;

    Ok(Json(group))
}

pub async fn delete_group(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let deletion = app_state
        .db_client
        .delete_upgrade_group(group_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Upgrade group not found"))?;

    tracing::info!(
        "Upgrade group {} deleted with {} categories and {} upgrades",
        group_id,
        deletion.deleted_categories,
        deletion.deleted_upgrades
    );

    Ok(Json(json!({
        "status": "success",
        "message": "Upgrade group deleted successfully",
        "deleted_categories": deletion.deleted_categories,
        "deleted_upgrades": deletion.deleted_upgrades,
    })))
}

pub async fn create_category(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<UpgradeCategoryDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let category = app_state
        .db_client
        .create_upgrade_category(body)
        .await
        .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
    WithRejection(Json(body), _): WithRejection<Json<UpgradeCategoryDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let category = app_state
        .db_client
        .update_upgrade_category(category_id, body)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Upgrade category not found"))?;

    Ok(Json(category))
}

pub async fn delete_category(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let removed = app_state
        .db_client
        .delete_upgrade_category(category_id)
        .await
        .map_err(db_error)?;

    if !removed {
        return Err(HttpError::not_found("Upgrade category not found"));
    }

    Ok(Json(deleted("Upgrade category")))
}

pub async fn create_upgrade(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<UpgradeDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let upgrade = app_state
        .db_client
        .create_upgrade(body)
        .await
        .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(upgrade)))
}

pub async fn update_upgrade(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(upgrade_id): Path<Uuid>,
    WithRejection(Json(body), _): WithRejection<Json<UpgradeDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let upgrade = app_state
        .db_client
        .update_upgrade(upgrade_id, body)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Upgrade not found"))?;

    Ok(Json(upgrade))
}

pub async fn delete_upgrade(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(upgrade_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let removed = app_state
        .db_client
        .delete_upgrade(upgrade_id)
        .await
        .map_err(db_error)?;

    if !removed {
        return Err(HttpError::not_found("Upgrade not found"));
    }

    Ok(Json(deleted("Upgrade")))
}
