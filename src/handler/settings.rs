use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use validator::Validate;

use crate::{
    dtos::settingdtos::UpsertSettingDto,
    error::HttpError,
    middleware::{auth, role_check},
    models::usermodel::UserRole,
    AppState,
};

pub fn settings_handler() -> Router {
    Router::new()
        .route("/", get(get_settings).post(upsert_setting))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            role_check(req, next, vec![UserRole::Admin])
        }))
        .route_layer(middleware::from_fn(auth))
}

pub async fn get_settings(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let settings = app_state.settings.all().await?;
    Ok(Json(settings))
}

pub async fn upsert_setting(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<UpsertSettingDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let value = app_state.settings.set(&body.key, body.value).await?;
    tracing::info!("Setting {} updated", body.key);

    Ok(Json(json!({ "key": body.key, "value": value })))
}
