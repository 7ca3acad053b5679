use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::{SignedCookieJar, WithRejection};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::enquirydb::{EnquiryExt, EnquiryFilters},
    dtos::enquirydtos::{CreateEnquiryDto, EnquiryQueryDto, UpdateEnquiryStatusDto},
    error::{db_error, HttpError},
    handler::deleted,
    middleware::auth,
    service::{
        captcha::{expired_captcha_cookie, verify_captcha},
        notification_service::NotificationJob,
    },
    utils::pagination::Paginated,
    AppState,
};

pub fn enquiries_handler() -> Router {
    let admin = Router::new()
        .route("/", get(get_enquiries))
        .route("/:id", get(get_enquiry).delete(delete_enquiry))
        .route("/:id/status", put(update_enquiry_status))
        .route_layer(middleware::from_fn(auth));

    Router::new()
        .route("/", post(create_enquiry))
        .merge(admin)
}

pub async fn create_enquiry(
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    WithRejection(Json(body), _): WithRejection<Json<CreateEnquiryDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let jar = SignedCookieJar::from_headers(&headers, app_state.cookie_key.clone());
    verify_captcha(&jar, body.captcha.as_deref())?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let new_enquiry = body
        .into_new_enquiry()
        .ok_or_else(|| HttpError::bad_request("Name is required"))?;
    let form = new_enquiry.form.clone();

    let enquiry = app_state
        .db_client
        .create_enquiry(new_enquiry)
        .await
        .map_err(db_error)?;

    tracing::info!("Enquiry {} received ({})", enquiry.id, enquiry.enquiry_type);

    for job in NotificationJob::for_enquiry(&enquiry, &form) {
        app_state.notifications.enqueue(job);
    }

    let jar = jar.remove(expired_captcha_cookie());
    Ok((StatusCode::CREATED, jar, Json(enquiry)))
}

pub async fn get_enquiries(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<EnquiryQueryDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let pagination = query.pagination();
    let filters = EnquiryFilters {
        status: query.status,
        enquiry_type: query.enquiry_type.clone(),
    };

    let (enquiries, total) = app_state
        .db_client
        .get_enquiries(&filters, pagination)
        .await
        .map_err(db_error)?;

    Ok(Json(Paginated::new(enquiries, total, pagination)))
}

pub async fn get_enquiry(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(enquiry_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let enquiry = app_state
        .db_client
        .get_enquiry(enquiry_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Enquiry not found"))?;

    Ok(Json(enquiry))
}

pub async fn update_enquiry_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(enquiry_id): Path<Uuid>,
    WithRejection(Json(body), _): WithRejection<Json<UpdateEnquiryStatusDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let enquiry = app_state
        .db_client
        .update_enquiry_status(enquiry_id, body.status)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Enquiry not found"))?;

    Ok(Json(enquiry))
}

pub async fn delete_enquiry(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(enquiry_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let removed = app_state
        .db_client
        .delete_enquiry(enquiry_id)
        .await
        .map_err(db_error)?;

    if !removed {
        return Err(HttpError::not_found("Enquiry not found"));
    }

    Ok(Json(deleted("Enquiry")))
}
