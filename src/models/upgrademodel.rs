use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct UpgradeGroup {
    pub id: Uuid,
    pub name: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct UpgradeCategory {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Upgrade {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub is_standard: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
pub struct UpgradeCategoryTree {
    #[serde(flatten)]
    pub category: UpgradeCategory,
    pub upgrades: Vec<Upgrade>,
}

#[derive(Debug, Serialize, Clone)]
pub struct UpgradeGroupTree {
    #[serde(flatten)]
    pub group: UpgradeGroup,
    pub categories: Vec<UpgradeCategoryTree>,
}

/// Rows removed when an upgrade group is deleted.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct GroupDeletion {
    pub deleted_categories: u64,
    pub deleted_upgrades: u64,
}

impl UpgradeGroupTree {
    /// Assembles the quote-builder catalog from flat rows. Groups keep the
    /// order they are given in; categories and upgrades attach to their parent.
    pub fn assemble(
        groups: Vec<UpgradeGroup>,
        categories: Vec<UpgradeCategory>,
        upgrades: Vec<Upgrade>,
    ) -> Vec<UpgradeGroupTree> {
        let mut trees: Vec<UpgradeGroupTree> = groups
            .into_iter()
            .map(|group| UpgradeGroupTree {
                group,
                categories: Vec::new(),
            })
            .collect();

        let mut category_trees: Vec<UpgradeCategoryTree> = categories
            .into_iter()
            .map(|category| UpgradeCategoryTree {
                category,
                upgrades: Vec::new(),
            })
            .collect();

        for upgrade in upgrades {
            if let Some(cat) = category_trees
                .iter_mut()
                .find(|c| c.category.id == upgrade.category_id)
            {
                cat.upgrades.push(upgrade);
            }
        }

        for category in category_trees {
            if let Some(tree) = trees
                .iter_mut()
                .find(|g| g.group.id == category.category.group_id)
            {
                tree.categories.push(category);
            }
        }

        trees
    }
}
