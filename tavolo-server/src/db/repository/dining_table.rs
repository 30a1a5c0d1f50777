//! Dining Table Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "tables";

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active tables of a restaurant
    pub async fn find_for_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM tables WHERE restaurant_id = $rid AND is_active = true ORDER BY name")
            .bind(("rid", restaurant_id.to_string()))
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<DiningTable>> {
        let thing = parse_record_id(id, "table")?;
        let table: Option<DiningTable> = self.base.db().select(thing).await?;
        Ok(table)
    }

    /// Find table by name within a restaurant
    pub async fn find_by_name(
        &self,
        restaurant_id: &str,
        name: &str,
    ) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM tables WHERE restaurant_id = $rid AND name = $name LIMIT 1")
            .bind(("rid", restaurant_id.to_string()))
            .bind(("name", name.to_string()))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Create a new dining table
    pub async fn create(
        &self,
        restaurant_id: &str,
        data: DiningTableCreate,
    ) -> RepoResult<DiningTable> {
        // Check duplicate name within the restaurant
        if self.find_by_name(restaurant_id, &data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Table '{}' already exists",
                data.name
            )));
        }

        let rid = parse_record_id(restaurant_id, "restaurant")?;
        let table = DiningTable {
            id: None,
            restaurant_id: rid,
            name: data.name,
            is_active: true,
        };

        let created: Option<DiningTable> = self.base.db().create(TABLE).content(table).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create dining table".to_string()))
    }

    /// Update a dining table
    pub async fn update(&self, id: &str, data: DiningTableUpdate) -> RepoResult<DiningTable> {
        let thing = parse_record_id(id, "table")?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Table {} not found", id)))?;

        let name = data.name.unwrap_or(existing.name);
        let is_active = data.is_active.unwrap_or(existing.is_active);

        self.base
            .db()
            .query("UPDATE $thing SET name = $name, is_active = $is_active")
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("is_active", is_active))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Table {} not found", id)))
    }
}
