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
    db::listingdb::ListingExt,
    dtos::listingdtos::{ListingDto, ListingQueryDto},
    error::{db_error, HttpError},
    handler::deleted,
    middleware::auth,
    utils::pagination::Paginated,
    AppState,
};

pub fn listings_handler() -> Router {
    let admin = Router::new()
        .route("/", post(create_listing))
        .route("/:id", put(update_listing).delete(delete_listing))
        .route_layer(middleware::from_fn(auth));

    Router::new()
        .route("/", get(get_listings))
        .route("/:id", get(get_listing))
        .merge(admin)
}

pub async fn get_listings(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<ListingQueryDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let pagination = query.pagination();

    let (listings, total) = app_state
        .db_client
        .get_listings(&query.filters(), pagination)
        .await
        .map_err(db_error)?;

    Ok(Json(Paginated::new(listings, total, pagination)))
}

pub async fn get_listing(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let listing = app_state
        .db_client
        .get_listing(listing_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Listing not found"))?;

    Ok(Json(listing))
}

pub async fn create_listing(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<ListingDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let listing = app_state
        .db_client
        .create_listing(body)
        .await
        .map_err(db_error)?;

    tracing::info!("Listing {} created", listing.id);
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn update_listing(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
    WithRejection(Json(body), _): WithRejection<Json<ListingDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let listing = app_state
        .db_client
        .update_listing(listing_id, body)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Listing not found"))?;

    Ok(Json(listing))
}

pub async fn delete_listing(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let removed = app_state
        .db_client
        .delete_listing(listing_id)
        .await
        .map_err(db_error)?;

    if !removed {
        return Err(HttpError::not_found("Listing not found"));
    }

    Ok(Json(deleted("Listing")))
}
