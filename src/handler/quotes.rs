use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use crate::{dtos::quotedtos::CreateSharedQuoteDto, error::HttpError, AppState};

pub fn quotes_handler() -> Router {
    Router::new()
        .route("/", post(create_shared_quote))
        .route("/:id", get(get_shared_quote))
}

pub async fn create_shared_quote(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<CreateSharedQuoteDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let quote = app_state.quotes.create(body).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

pub async fn get_shared_quote(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(quote_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let quote = app_state.quotes.get(quote_id).await?;
    Ok(Json(quote))
}
