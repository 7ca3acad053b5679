// db.rs
use sqlx::{Pool, Postgres};

pub mod enquirydb;
pub mod facadedb;
pub mod floorplandb;
pub mod listingdb;
pub mod pagedb;
pub mod quotedb;
pub mod reviewdb;
pub mod serviceareadb;
pub mod settingdb;
pub mod upgradedb;
pub mod userdb;

#[derive(Debug, Clone)]
pub struct DBClient {
    pub pool: Pool<Postgres>,
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}

/// Removes duplicate ids while keeping first-seen order.
pub fn unique_ids(ids: impl IntoIterator<Item = uuid::Uuid>) -> Vec<uuid::Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn unique_ids_keeps_first_occurrence_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(unique_ids(vec![b, a, b, a]), vec![b, a]);
        assert!(unique_ids(Vec::new()).is_empty());
    }
}
