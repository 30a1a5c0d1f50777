//! Category Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::Category;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "categories";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all categories of a restaurant, in display order
    pub async fn find_for_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query("SELECT * FROM categories WHERE restaurant_id = $rid ORDER BY display_order")
            .bind(("rid", restaurant_id.to_string()))
            .await?
            .take(0)?;
        Ok(categories)
    }

    /// Find category by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Category>> {
        let thing = parse_record_id(id, "category")?;
        let category: Option<Category> = self.base.db().select(thing).await?;
        Ok(category)
    }

    /// Create a new category
    pub async fn create(
        &self,
        restaurant_id: &str,
        name: String,
        display_order: i32,
    ) -> RepoResult<Category> {
        let rid = parse_record_id(restaurant_id, "restaurant")?;
        let category = Category {
            id: None,
            restaurant_id: rid,
            name,
            description: None,
            display_order,
        };
        let created: Option<Category> = self.base.db().create(TABLE).content(category).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }
}
