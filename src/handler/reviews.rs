use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{delete, get, put},
    Extension, Json, Router,
};
use axum_extra::extract::{SignedCookieJar, WithRejection};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::reviewdb::ReviewExt,
    dtos::reviewdtos::{CreateReviewDto, NewReview, ReviewApprovalDto, ReviewQueryDto},
    error::{db_error, HttpError},
    handler::deleted,
    middleware::auth,
    models::reviewmodel::Review,
    service::{
        captcha::{expired_captcha_cookie, verify_captcha},
        settings_service::SettingsService,
    },
    utils::pagination::Paginated,
    AppState,
};

pub fn reviews_handler() -> Router {
    let admin = Router::new()
        .route("/all", get(get_all_reviews))
        .route("/:id/approval", put(set_review_approval))
        .route("/:id", delete(delete_review))
        .route_layer(middleware::from_fn(auth));

    Router::new()
        .route("/", get(get_approved_reviews).post(create_review))
        .merge(admin)
}

/// The approval flag is fixed from the setting in force at submission time.
pub async fn submit_review(
    store: &(dyn ReviewExt + Send + Sync),
    settings: &SettingsService,
    review: NewReview,
) -> Result<Review, HttpError> {
    let is_approved = settings.auto_approve_reviews().await?;
    store
        .create_review(review, is_approved)
        .await
        .map_err(db_error)
}

pub async fn create_review(
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    WithRejection(Json(body), _): WithRejection<Json<CreateReviewDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let jar = SignedCookieJar::from_headers(&headers, app_state.cookie_key.clone());
    verify_captcha(&jar, body.captcha.as_deref())?;

    let new_review = body
        .into_new_review()
        .ok_or_else(|| HttpError::bad_request("All fields are required"))?;

    let review = submit_review(app_state.db_client.as_ref(), &app_state.settings, new_review).await?;

    tracing::info!("Review {} received (approved: {})", review.id, review.is_approved);

    let jar = jar.remove(expired_captcha_cookie());
    Ok((StatusCode::CREATED, jar, Json(review)))
}

pub async fn get_approved_reviews(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<ReviewQueryDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let pagination = query.pagination();

    let (reviews, total) = app_state
        .db_client
        .get_reviews(true, pagination)
        .await
        .map_err(db_error)?;

    Ok(Json(Paginated::new(reviews, total, pagination)))
}

pub async fn get_all_reviews(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<ReviewQueryDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let pagination = query.pagination();

    let (reviews, total) = app_state
        .db_client
        .get_reviews(false, pagination)
        .await
        .map_err(db_error)?;

    Ok(Json(Paginated::new(reviews, total, pagination)))
}

pub async fn set_review_approval(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(review_id): Path<Uuid>,
    WithRejection(Json(body), _): WithRejection<Json<ReviewApprovalDto>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    let review = app_state
        .db_client
        .set_review_approval(review_id, body.is_approved)
        .await
        .map_err(db_error)?
        .ok_or_else(|| HttpError::not_found("Review not found"))?;

    Ok(Json(review))
}

pub async fn delete_review(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(review_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let removed = app_state
        .db_client
        .delete_review(review_id)
        .await
        .map_err(db_error)?;

    if !removed {
        return Err(HttpError::not_found("Review not found"));
    }

    Ok(Json(deleted("Review")))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::service::settings_service::tests::MemorySettings;

    #[derive(Default)]
    struct MemoryReviews {
        rows: Mutex<Vec<Review>>,
    }

    #[async_trait]
    impl ReviewExt for MemoryReviews {
        async fn create_review(&self, review: NewReview, is_approved: bool) -> Result<Review, sqlx::Error> {
            let row = Review {
                id: Uuid::new_v4(),
                name: review.name,
                email: review.email,
                rating: review.rating,
                comment: review.comment,
                is_approved,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn get_reviews(
            &self,
            approved_only: bool,
            _pagination: crate::utils::pagination::Pagination,
        ) -> Result<(Vec<Review>, i64), sqlx::Error> {
            let rows: Vec<Review> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| !approved_only || r.is_approved)
                .cloned()
                .collect();
            let total = rows.len() as i64;
            Ok((rows, total))
        }

        async fn set_review_approval(
            &self,
            review_id: Uuid,
            is_approved: bool,
        ) -> Result<Option<Review>, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.iter_mut().find(|r| r.id == review_id).map(|r| {
                r.is_approved = is_approved;
                r.clone()
            }))
        }

        async fn delete_review(&self, review_id: Uuid) -> Result<bool, sqlx::Error> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != review_id);
            Ok(rows.len() < before)
        }
    }

    fn review() -> NewReview {
        NewReview {
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            rating: 5,
            comment: "Great build".to_string(),
        }
    }

    fn settings(entries: &[(&str, serde_json::Value)]) -> SettingsService {
        SettingsService::new(Arc::new(MemorySettings::with(entries)), None)
    }

    #[tokio::test]
    async fn reviews_wait_for_moderation_by_default() {
        let store = MemoryReviews::default();

        let created = submit_review(&store, &settings(&[]), review()).await.unwrap();
        assert!(!created.is_approved);

        let (public, _) = store.get_reviews(true, Default::default()).await.unwrap();
        assert!(public.is_empty());
    }

    #[tokio::test]
    async fn auto_approve_setting_publishes_immediately() {
        let store = MemoryReviews::default();

        for value in [json!(true), json!("true")] {
            let settings = settings(&[("autoApproveReviews", value)]);
            let created = submit_review(&store, &settings, review()).await.unwrap();
            assert!(created.is_approved);
        }

        let off = settings(&[("autoApproveReviews", json!(false))]);
        assert!(!submit_review(&store, &off, review()).await.unwrap().is_approved);

        let (public, total) = store.get_reviews(true, Default::default()).await.unwrap();
        assert_eq!(public.len(), 2);
        assert_eq!(total, 2);
    }
}
