use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    db::DBClient,
    dtos::enquirydtos::NewEnquiry,
    models::enquirymodel::{Enquiry, EnquiryStatus},
    utils::pagination::Pagination,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct EnquiryFilters {
    pub status: Option<EnquiryStatus>,
    pub enquiry_type: Option<String>,
}

impl EnquiryFilters {
    fn push_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push(" FROM enquiries WHERE TRUE");

        if let Some(status) = self.status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        if let Some(enquiry_type) = &self.enquiry_type {
            qb.push(" AND enquiry_type = ");
            qb.push_bind(enquiry_type.clone());
        }
    }
}

pub fn enquiry_page_query(
    filters: &EnquiryFilters,
    pagination: Pagination,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT *");
    filters.push_where(&mut qb);
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    qb.push_bind(pagination.limit());
    qb.push(" OFFSET ");
    qb.push_bind(pagination.offset());
    qb
}

pub fn enquiry_count_query(filters: &EnquiryFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*)");
    filters.push_where(&mut qb);
    qb
}

#[async_trait]
pub trait EnquiryExt {
    async fn create_enquiry(&self, enquiry: NewEnquiry) -> Result<Enquiry, sqlx::Error>;

    async fn get_enquiries(
        &self,
        filters: &EnquiryFilters,
        pagination: Pagination,
    ) -> Result<(Vec<Enquiry>, i64), sqlx::Error>;

    async fn get_enquiry(&self, enquiry_id: Uuid) -> Result<Option<Enquiry>, sqlx::Error>;

    async fn update_enquiry_status(
        &self,
        enquiry_id: Uuid,
        status: EnquiryStatus,
    ) -> Result<Option<Enquiry>, sqlx::Error>;

    async fn delete_enquiry(&self, enquiry_id: Uuid) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl EnquiryExt for DBClient {
    async fn create_enquiry(&self, enquiry: NewEnquiry) -> Result<Enquiry, sqlx::Error> {
        let details = serde_json::to_value(&enquiry.form)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query_as::<_, Enquiry>(
            r#"
            INSERT INTO enquiries (enquiry_type, name, email, phone, collection, listing_id, details)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(enquiry.form.type_tag())
        .bind(enquiry.name)
        .bind(enquiry.email)
        .bind(enquiry.phone)
        .bind(enquiry.collection)
        .bind(enquiry.listing_id)
        .bind(details)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_enquiries(
        &self,
        filters: &EnquiryFilters,
        pagination: Pagination,
    ) -> Result<(Vec<Enquiry>, i64), sqlx::Error> {
        let enquiries = enquiry_page_query(filters, pagination)
            .build_query_as::<Enquiry>()
            .fetch_all(&self.pool)
            .await?;

        let total = enquiry_count_query(filters)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok((enquiries, total))
    }

    async fn get_enquiry(&self, enquiry_id: Uuid) -> Result<Option<Enquiry>, sqlx::Error> {
        sqlx::query_as::<_, Enquiry>("SELECT * FROM enquiries WHERE id = $1")
            .bind(enquiry_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn update_enquiry_status(
        &self,
        enquiry_id: Uuid,
        status: EnquiryStatus,
    ) -> Result<Option<Enquiry>, sqlx::Error> {
        sqlx::query_as::<_, Enquiry>(
            "UPDATE enquiries SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(status)
        .bind(enquiry_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_enquiry(&self, enquiry_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM enquiries WHERE id = $1")
            .bind(enquiry_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_type_filters_combine() {
        let filters = EnquiryFilters {
            status: Some(EnquiryStatus::New),
            enquiry_type: Some("QUOTE_ENQUIRY".to_string()),
        };
        assert_eq!(
            enquiry_count_query(&filters).sql(),
            "SELECT COUNT(*) FROM enquiries WHERE TRUE AND status = $1 AND enquiry_type = $2"
        );
    }

    #[test]
    fn unfiltered_page_is_newest_first() {
        let qb = enquiry_page_query(&EnquiryFilters::default(), Pagination::default());
        assert_eq!(
            qb.sql(),
            "SELECT * FROM enquiries WHERE TRUE ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
    }
}
