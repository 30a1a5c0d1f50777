//! Table Token Repository
//!
//! 令牌只追加和打标记，从不删除（审计要求）。

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::TableToken;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const TABLE: &str = "table_tokens";

#[derive(Clone)]
pub struct TableTokenRepository {
    base: BaseRepository,
}

impl TableTokenRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Insert a new token row
    pub async fn insert(&self, token: TableToken) -> RepoResult<TableToken> {
        let created: Option<TableToken> = self.base.db().create(TABLE).content(token).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create table token".to_string()))
    }

    /// Look up a token through the stored `fn::validate_table_token` function
    ///
    /// Returns the row regardless of its revoked/expired flags; the caller
    /// classifies the rejection reason.
    pub async fn find_by_token(&self, token: &str) -> RepoResult<Option<TableToken>> {
        let mut result = self
            .base
            .db()
            .query("RETURN fn::validate_table_token($token)")
            .bind(("token", token.to_string()))
            .await?;
        let rows: Vec<TableToken> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Most recent non-revoked token of a table, if any
    pub async fn find_live_for_table(
        &self,
        restaurant_id: &str,
        table_id: &str,
    ) -> RepoResult<Option<TableToken>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM table_tokens \
                 WHERE restaurant_id = $rid AND table_id = $tid AND revoked = false \
                 ORDER BY created_at DESC LIMIT 1",
            )
            .bind(("rid", restaurant_id.to_string()))
            .bind(("tid", table_id.to_string()))
            .await?;
        let rows: Vec<TableToken> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Mark every non-revoked token of a table as revoked; idempotent
    pub async fn revoke_all_for_table(
        &self,
        restaurant_id: &str,
        table_id: &str,
    ) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE table_tokens SET revoked = true \
                 WHERE restaurant_id = $rid AND table_id = $tid AND revoked = false",
            )
            .bind(("rid", restaurant_id.to_string()))
            .bind(("tid", table_id.to_string()))
            .await?;
        let updated: Vec<TableToken> = result.take(0)?;
        Ok(updated.len() as u64)
    }

    /// Stamp the last-used timestamp after a successful validation
    pub async fn touch(&self, token_id: &RecordId, at_millis: i64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $thing SET last_used_at = $at")
            .bind(("thing", token_id.clone()))
            .bind(("at", at_millis))
            .await?;
        Ok(())
    }

    /// Persist the party size on the session row
    pub async fn set_guest_count(&self, token_id: &str, guest_count: i32) -> RepoResult<()> {
        let thing = parse_record_id(token_id, "token")?;
        self.base
            .db()
            .query("UPDATE $thing SET guest_count = $count")
            .bind(("thing", thing))
            .bind(("count", guest_count))
            .await?;
        Ok(())
    }
}
