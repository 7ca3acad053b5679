use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::DBClient,
    dtos::upgradedtos::{UpgradeCategoryDto, UpgradeDto, UpgradeGroupDto},
    models::upgrademodel::{
        GroupDeletion, Upgrade, UpgradeCategory, UpgradeGroup, UpgradeGroupTree,
    },
};

#[async_trait]
pub trait UpgradeExt {
    /// Groups and categories by display order, with their upgrades nested.
    async fn get_upgrade_catalog(&self, active_only: bool) -> Result<Vec<UpgradeGroupTree>, sqlx::Error>;

    async fn create_upgrade_group(&self, dto: UpgradeGroupDto) -> Result<UpgradeGroup, sqlx::Error>;

    async fn update_upgrade_group(
        &self,
        group_id: Uuid,
        dto: UpgradeGroupDto,
    ) -> Result<Option<UpgradeGroup>, sqlx::Error>;

    /// Removes the group, its categories and their upgrades in one transaction.
    async fn delete_upgrade_group(&self, group_id: Uuid) -> Result<Option<GroupDeletion>, sqlx::Error>;

    async fn create_upgrade_category(
        &self,
        dto: UpgradeCategoryDto,
    ) -> Result<UpgradeCategory, sqlx::Error>;

    async fn update_upgrade_category(
        &self,
        category_id: Uuid,
        dto: UpgradeCategoryDto,
    ) -> Result<Option<UpgradeCategory>, sqlx::Error>;

    async fn delete_upgrade_category(&self, category_id: Uuid) -> Result<bool, sqlx::Error>;

    async fn create_upgrade(&self, dto: UpgradeDto) -> Result<Upgrade, sqlx::Error>;

    async fn update_upgrade(&self, upgrade_id: Uuid, dto: UpgradeDto) -> Result<Option<Upgrade>, sqlx::Error>;

    async fn delete_upgrade(&self, upgrade_id: Uuid) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl UpgradeExt for DBClient {
    async fn get_upgrade_catalog(&self, active_only: bool) -> Result<Vec<UpgradeGroupTree>, sqlx::Error> {
        let groups = sqlx::query_as::<_, UpgradeGroup>(
            "SELECT * FROM upgrade_groups ORDER BY display_order ASC, name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let categories = sqlx::query_as::<_, UpgradeCategory>(
            "SELECT * FROM upgrade_categories ORDER BY display_order ASC, name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let upgrades = sqlx::query_as::<_, Upgrade>(
            r#"
            SELECT * FROM upgrades
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY is_standard DESC, name ASC
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(UpgradeGroupTree::assemble(groups, categories, upgrades))
    }

    async fn create_upgrade_group(&self, dto: UpgradeGroupDto) -> Result<UpgradeGroup, sqlx::Error> {
        sqlx::query_as::<_, UpgradeGroup>(
            "INSERT INTO upgrade_groups (name, display_order) VALUES ($1, COALESCE($2, 0)) RETURNING *",
        )
        .bind(dto.name)
        .bind(dto.display_order)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_upgrade_group(
        &self,
        group_id: Uuid,
        dto: UpgradeGroupDto,
    ) -> Result<Option<UpgradeGroup>, sqlx::Error> {
        sqlx::query_as::<_, UpgradeGroup>(
            r#"
            UPDATE upgrade_groups
            SET name = $1, display_order = COALESCE($2, display_order), updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(dto.name)
        .bind(dto.display_order)
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_upgrade_group(&self, group_id: Uuid) -> Result<Option<GroupDeletion>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let deleted_upgrades = sqlx::query(
            r#"
            DELETE FROM upgrades
            WHERE category_id IN (SELECT id FROM upgrade_categories WHERE group_id = $1)
            "#,
        )
        .bind(group_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let deleted_categories = sqlx::query("DELETE FROM upgrade_categories WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted_groups = sqlx::query("DELETE FROM upgrade_groups WHERE id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted_groups == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;

        Ok(Some(GroupDeletion {
            deleted_categories,
            deleted_upgrades,
        }))
    }

    async fn create_upgrade_category(
        &self,
        dto: UpgradeCategoryDto,
    ) -> Result<UpgradeCategory, sqlx::Error> {
        sqlx::query_as::<_, UpgradeCategory>(
            r#"
            INSERT INTO upgrade_categories (group_id, name, display_order)
            VALUES ($1, $2, COALESCE($3, 0))
            RETURNING *
            "#,
        )
        .bind(dto.group_id)
        .bind(dto.name)
        .bind(dto.display_order)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_upgrade_category(
        &self,
        category_id: Uuid,
        dto: UpgradeCategoryDto,
    ) -> Result<Option<UpgradeCategory>, sqlx::Error> {
        sqlx::query_as::<_, UpgradeCategory>(
            r#"
            UPDATE upgrade_categories
            SET group_id = $1, name = $2, display_order = COALESCE($3, display_order), updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(dto.group_id)
        .bind(dto.name)
        .bind(dto.display_order)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_upgrade_category(&self, category_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM upgrade_categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_upgrade(&self, dto: UpgradeDto) -> Result<Upgrade, sqlx::Error> {
        sqlx::query_as::<_, Upgrade>(
            r#"
            INSERT INTO upgrades (category_id, name, description, price, image_url, is_standard, is_active)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, FALSE), COALESCE($7, TRUE))
            RETURNING *
            "#,
        )
        .bind(dto.category_id)
        .bind(dto.name)
        .bind(dto.description)
        .bind(dto.price)
        .bind(dto.image_url)
        .bind(dto.is_standard)
        .bind(dto.is_active)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_upgrade(&self, upgrade_id: Uuid, dto: UpgradeDto) -> Result<Option<Upgrade>, sqlx::Error> {
        sqlx::query_as::<_, Upgrade>(
            r#"
            UPDATE upgrades SET
                category_id = $1, name = $2, description = $3, price = $4, image_url = $5,
                is_standard = COALESCE($6, is_standard), is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(dto.category_id)
        .bind(dto.name)
        .bind(dto.description)
        .bind(dto.price)
        .bind(dto.image_url)
        .bind(dto.is_standard)
        .bind(dto.is_active)
        .bind(upgrade_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_upgrade(&self, upgrade_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM upgrades WHERE id = $1")
            .bind(upgrade_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::PgPool;

    async fn seed_group(db: &DBClient, name: &str) -> (UpgradeGroup, UpgradeCategory, Upgrade) {
        let group = db
            .create_upgrade_group(serde_json::from_value(json!({ "name": name })).unwrap())
            .await
            .unwrap();
        let category = db
            .create_upgrade_category(
                serde_json::from_value(json!({ "group_id": group.id, "name": "Benchtops" })).unwrap(),
            )
            .await
            .unwrap();
        let upgrade = db
            .create_upgrade(
                serde_json::from_value(json!({
                    "category_id": category.id,
                    "name": "Stone benchtop",
                    "price": "4200",
                }))
                .unwrap(),
            )
            .await
            .unwrap();
        (group, category, upgrade)
    }

    async fn count(pool: &PgPool, sql: &str, id: Uuid) -> i64 {
        sqlx::query_scalar::<_, i64>(sql)
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deleting_a_group_removes_its_categories_and_upgrades(pool: PgPool) {
        let db = DBClient::new(pool.clone());
        let (kitchen, benchtops, _) = seed_group(&db, "Kitchen").await;
        let (outdoor, _, decking) = seed_group(&db, "Outdoor").await;

        let deletion = db.delete_upgrade_group(kitchen.id).await.unwrap();
        assert_eq!(
            deletion,
            Some(GroupDeletion {
                deleted_categories: 1,
                deleted_upgrades: 1,
            })
        );

        assert_eq!(
            count(&pool, "SELECT COUNT(*) FROM upgrade_categories WHERE group_id = $1", kitchen.id).await,
            0
        );
        assert_eq!(
            count(&pool, "SELECT COUNT(*) FROM upgrades WHERE category_id = $1", benchtops.id).await,
            0
        );

        // The other group is untouched.
        assert_eq!(
            count(&pool, "SELECT COUNT(*) FROM upgrade_categories WHERE group_id = $1", outdoor.id).await,
            1
        );
        assert_eq!(
            count(&pool, "SELECT COUNT(*) FROM upgrades WHERE id = $1", decking.id).await,
            1
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deleting_a_missing_group_reports_nothing(pool: PgPool) {
        let db = DBClient::new(pool);
        seed_group(&db, "Kitchen").await;

        assert_eq!(db.delete_upgrade_group(Uuid::new_v4()).await.unwrap(), None);
        assert_eq!(db.get_upgrade_catalog(false).await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn public_catalog_hides_inactive_upgrades(pool: PgPool) {
        let db = DBClient::new(pool);
        let (_, category, _) = seed_group(&db, "Kitchen").await;
        db.create_upgrade(
            serde_json::from_value(json!({
                "category_id": category.id,
                "name": "Retired tapware",
                "is_active": false,
            }))
            .unwrap(),
        )
        .await
        .unwrap();

        let public = db.get_upgrade_catalog(true).await.unwrap();
        assert_eq!(public[0].categories[0].upgrades.len(), 1);
        assert_eq!(public[0].categories[0].upgrades[0].name, "Stone benchtop");

        let full = db.get_upgrade_catalog(false).await.unwrap();
        assert_eq!(full[0].categories[0].upgrades.len(), 2);
    }
}
