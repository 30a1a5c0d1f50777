//! Waiter Call Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::WaiterCall;
use crate::utils::now_millis;
use shared::CallStatus;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "waiter_calls";

#[derive(Clone)]
pub struct WaiterCallRepository {
    base: BaseRepository,
}

impl WaiterCallRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Append a new active call for a table
    pub async fn create(&self, restaurant_id: &str, table_id: &str) -> RepoResult<WaiterCall> {
        let rid = parse_record_id(restaurant_id, "restaurant")?;
        let tid = parse_record_id(table_id, "table")?;
        let call = WaiterCall {
            id: None,
            restaurant_id: rid,
            table_id: tid,
            status: CallStatus::Active,
            created_at: now_millis(),
            resolved_at: None,
        };
        let created: Option<WaiterCall> = self.base.db().create(TABLE).content(call).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create waiter call".to_string()))
    }

    /// Active calls of a restaurant, oldest first
    pub async fn find_active(&self, restaurant_id: &str) -> RepoResult<Vec<WaiterCall>> {
        let calls: Vec<WaiterCall> = self
            .base
            .db()
            .query(
                "SELECT * FROM waiter_calls WHERE restaurant_id = $rid AND status = $status \
                 ORDER BY created_at",
            )
            .bind(("rid", restaurant_id.to_string()))
            .bind(("status", "active"))
            .await?
            .take(0)?;
        Ok(calls)
    }

    /// Find call by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<WaiterCall>> {
        let thing = parse_record_id(id, "waiter call")?;
        let call: Option<WaiterCall> = self.base.db().select(thing).await?;
        Ok(call)
    }

    /// Resolve a call: `active → resolved`, one-way
    pub async fn resolve(&self, id: &str) -> RepoResult<WaiterCall> {
        let thing = parse_record_id(id, "waiter call")?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Waiter call {} not found", id)))?;

        if existing.status == CallStatus::Resolved {
            // Idempotent: resolving twice keeps the original resolved_at
            return Ok(existing);
        }

        self.base
            .db()
            .query("UPDATE $thing SET status = $status, resolved_at = $at")
            .bind(("thing", thing))
            .bind(("status", "resolved"))
            .bind(("at", now_millis()))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Waiter call {} not found", id)))
    }
}
