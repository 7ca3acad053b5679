use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::DBClient,
    dtos::reviewdtos::NewReview,
    models::reviewmodel::Review,
    utils::pagination::Pagination,
};

#[async_trait]
pub trait ReviewExt {
    async fn create_review(&self, review: NewReview, is_approved: bool) -> Result<Review, sqlx::Error>;

    /// Newest first. Public callers pass `approved_only`.
    async fn get_reviews(
        &self,
        approved_only: bool,
        pagination: Pagination,
    ) -> Result<(Vec<Review>, i64), sqlx::Error>;

    async fn set_review_approval(
        &self,
        review_id: Uuid,
        is_approved: bool,
    ) -> Result<Option<Review>, sqlx::Error>;

    async fn delete_review(&self, review_id: Uuid) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl ReviewExt for DBClient {
    async fn create_review(&self, review: NewReview, is_approved: bool) -> Result<Review, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (name, email, rating, comment, is_approved)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(review.name)
        .bind(review.email)
        .bind(review.rating)
        .bind(review.comment)
        .bind(is_approved)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_reviews(
        &self,
        approved_only: bool,
        pagination: Pagination,
    ) -> Result<(Vec<Review>, i64), sqlx::Error> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE ($1 = FALSE OR is_approved = TRUE)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(approved_only)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reviews WHERE ($1 = FALSE OR is_approved = TRUE)",
        )
        .bind(approved_only)
        .fetch_one(&self.pool)
        .await?;

        Ok((reviews, total))
    }

    async fn set_review_approval(
        &self,
        review_id: Uuid,
        is_approved: bool,
    ) -> Result<Option<Review>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            "UPDATE reviews SET is_approved = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(is_approved)
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_review(&self, review_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
