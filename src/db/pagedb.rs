use async_trait::async_trait;

use crate::{db::DBClient, dtos::pagedtos::UpsertPageDto, models::pagemodel::Page};

#[async_trait]
pub trait PageExt {
    async fn get_page(&self, slug: &str) -> Result<Option<Page>, sqlx::Error>;

    async fn get_pages(&self) -> Result<Vec<Page>, sqlx::Error>;

    async fn upsert_page(&self, slug: &str, dto: UpsertPageDto) -> Result<Page, sqlx::Error>;

    async fn delete_page(&self, slug: &str) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl PageExt for DBClient {
    async fn get_page(&self, slug: &str) -> Result<Option<Page>, sqlx::Error> {
        sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_pages(&self) -> Result<Vec<Page>, sqlx::Error> {
        sqlx::query_as::<_, Page>("SELECT * FROM pages ORDER BY slug ASC")
            .fetch_all(&self.pool)
            .await
    }

    async fn upsert_page(&self, slug: &str, dto: UpsertPageDto) -> Result<Page, sqlx::Error> {
        sqlx::query_as::<_, Page>(
            r#"
            INSERT INTO pages (slug, title, content)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO UPDATE
                SET title = EXCLUDED.title, content = EXCLUDED.content, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(slug)
        .bind(dto.title)
        .bind(dto.content)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_page(&self, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pages WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
