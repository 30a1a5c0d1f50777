//! Token lifecycle service
//!
//! Issues, validates and revokes table-access tokens. At most one
//! non-revoked, non-expired token is authoritative per table: `issue`
//! revokes every predecessor before inserting the replacement.
//!
//! The revoke-then-insert pair is two sequential storage writes, not a
//! transaction. Issuance for the same table is therefore serialized through
//! a per-table async mutex, which closes the interleaving window within one
//! server process.

use crate::db::models::TableToken;
use crate::db::repository::{
    DiningTableRepository, RestaurantRepository, TableTokenRepository, parse_record_id,
};
use crate::realtime::{ChangeFeed, resources};
use crate::utils::{AppError, AppResult, now_millis};
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use shared::{ChangeAction, IssuedToken, TableSession, TokenRejection};
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::Mutex;

/// Token validity window: 2 hours
pub const TOKEN_TTL_MILLIS: i64 = 2 * 60 * 60 * 1000;

/// Token entropy: 128 bits, hex encoded
const TOKEN_BYTES: usize = 16;

/// Table token lifecycle service
#[derive(Clone)]
pub struct TokenService {
    tokens: TableTokenRepository,
    tables: DiningTableRepository,
    restaurants: RestaurantRepository,
    feed: ChangeFeed,
    /// Per-table issuance locks, keyed by `"restaurant_id/table_id"`
    issue_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl TokenService {
    pub fn new(db: Surreal<Db>, feed: ChangeFeed) -> Self {
        Self {
            tokens: TableTokenRepository::new(db.clone()),
            tables: DiningTableRepository::new(db.clone()),
            restaurants: RestaurantRepository::new(db),
            feed,
            issue_locks: Arc::new(DashMap::new()),
        }
    }

    // =========================================================================
    // Issue
    // =========================================================================

    /// Issue a fresh token for a table, revoking all prior ones
    ///
    /// `base_url` is the public origin used to build the customer-menu
    /// redirect URL.
    pub async fn issue(
        &self,
        restaurant_id: &str,
        table_id: &str,
        base_url: &str,
    ) -> AppResult<IssuedToken> {
        if self
            .restaurants
            .find_by_id(restaurant_id)
            .await?
            .filter(|r| r.is_active)
            .is_none()
        {
            return Err(AppError::not_found(format!(
                "Restaurant {} not found",
                restaurant_id
            )));
        }
        let table = self
            .tables
            .find_by_id(table_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| AppError::not_found(format!("Table {} not found", table_id)))?;
        if table.restaurant_id.to_string() != restaurant_id {
            return Err(AppError::not_found(format!(
                "Table {} not found",
                table_id
            )));
        }

        let lock = self.issue_lock(restaurant_id, table_id);
        let _guard = lock.lock().await;

        // Party size survives a re-scan during the same seating: the token
        // being superseded donates its guest_count. After a table close every
        // token is already revoked, so the next seating starts clean.
        let carried_guest_count = self
            .tokens
            .find_live_for_table(restaurant_id, table_id)
            .await?
            .and_then(|t| t.guest_count);

        // Revoke previous tokens for this table, then insert the new one.
        // Two writes; serialized per table by the guard above.
        self.tokens
            .revoke_all_for_table(restaurant_id, table_id)
            .await?;

        let now = now_millis();
        let token_string = self.generate_token(table_id);
        let row = TableToken {
            id: None,
            restaurant_id: parse_record_id(restaurant_id, "restaurant")?,
            table_id: parse_record_id(table_id, "table")?,
            token: token_string.clone(),
            expires_at: now + TOKEN_TTL_MILLIS,
            revoked: false,
            guest_count: carried_guest_count,
            created_at: now,
            last_used_at: None,
        };
        let created = self.tokens.insert(row).await?;

        self.feed.notify(
            resources::TABLE_TOKENS,
            ChangeAction::Insert,
            restaurant_id,
            created.id.as_ref().map(|id| id.to_string()),
        );
        tracing::info!(table = %table_id, "Issued new table token");

        Ok(IssuedToken {
            redirect_url: format!(
                "{}/{}/{}?token={}",
                base_url.trim_end_matches('/'),
                record_key(restaurant_id),
                record_key(table_id),
                token_string
            ),
            token: token_string,
            expires_at: created.expires_at,
        })
    }

    /// 128-bit hex token; falls back to a timestamp+uuid string if the
    /// secure generator is unavailable
    fn generate_token(&self, table_id: &str) -> String {
        let rng = SystemRandom::new();
        let mut bytes = [0u8; TOKEN_BYTES];
        match rng.fill(&mut bytes) {
            Ok(()) => hex::encode(bytes),
            Err(_) => {
                tracing::warn!("Secure RNG unavailable, using fallback token generator");
                format!(
                    "{}-{}-{}",
                    record_key(table_id),
                    now_millis(),
                    uuid::Uuid::new_v4().simple()
                )
            }
        }
    }

    // =========================================================================
    // Validate
    // =========================================================================

    /// Validate a bearer token against the table the URL claims
    ///
    /// Classification order: unknown token, then scope mismatches, then
    /// expiry, then revocation. Each reason maps to its own customer-facing
    /// message (`TokenRejection`).
    pub async fn validate(
        &self,
        token: &str,
        expected_restaurant: &str,
        expected_table: &str,
    ) -> AppResult<TableSession> {
        let row = self
            .tokens
            .find_by_token(token)
            .await?
            .ok_or(AppError::TokenInvalid(TokenRejection::NotFound))?;

        if row.restaurant_id.to_string() != expected_restaurant {
            return Err(AppError::TokenInvalid(TokenRejection::RestaurantMismatch));
        }
        if row.table_id.to_string() != expected_table {
            return Err(AppError::TokenInvalid(TokenRejection::TableMismatch));
        }

        let now = now_millis();
        if now > row.expires_at {
            return Err(AppError::TokenInvalid(TokenRejection::Expired));
        }
        if row.revoked {
            return Err(AppError::TokenInvalid(TokenRejection::Revoked));
        }

        // last_used_at is informational; a failed stamp must not fail the
        // validation itself
        if let Some(id) = row.id.as_ref()
            && let Err(e) = self.tokens.touch(id, now).await
        {
            tracing::warn!(error = %e, "Failed to stamp token last_used_at");
        }

        Ok(TableSession {
            token_id: row.id.map(|id| id.to_string()).unwrap_or_default(),
            restaurant_id: row.restaurant_id.to_string(),
            table_id: row.table_id.to_string(),
            expires_at: row.expires_at,
            guest_count: row.guest_count,
        })
    }

    // =========================================================================
    // Revoke
    // =========================================================================

    /// Revoke every token of a table; idempotent
    ///
    /// Called when the table's bill is fully settled, so the next seating
    /// must scan a fresh QR code.
    pub async fn revoke_all_for_table(
        &self,
        restaurant_id: &str,
        table_id: &str,
    ) -> AppResult<u64> {
        let revoked = self
            .tokens
            .revoke_all_for_table(restaurant_id, table_id)
            .await?;
        if revoked > 0 {
            self.feed.notify(
                resources::TABLE_TOKENS,
                ChangeAction::Update,
                restaurant_id,
                None,
            );
            tracing::info!(table = %table_id, count = revoked, "Revoked table tokens");
        }
        Ok(revoked)
    }

    /// Persist the party size on the session row
    pub async fn set_guest_count(&self, token_id: &str, guest_count: i32) -> AppResult<()> {
        self.tokens.set_guest_count(token_id, guest_count).await?;
        Ok(())
    }

    fn issue_lock(&self, restaurant_id: &str, table_id: &str) -> Arc<Mutex<()>> {
        let key = format!("{}/{}", restaurant_id, table_id);
        self.issue_locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Key part of a `"table:id"` string, for URL building
fn record_key(id: &str) -> &str {
    id.split_once(':').map(|(_, key)| key).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{DiningTableCreate, RestaurantCreate};
    use crate::db::repository::DiningTableRepository;

    async fn setup() -> (TokenService, String, String) {
        let db = DbService::open_memory().await.unwrap();
        let feed = ChangeFeed::new();
        let restaurants = RestaurantRepository::new(db.db.clone());
        let restaurant = restaurants
            .create(RestaurantCreate {
                name: "Trattoria Uno".to_string(),
                address: None,
                phone: None,
            })
            .await
            .unwrap();
        let rid = restaurant.id.unwrap().to_string();
        let tables = DiningTableRepository::new(db.db.clone());
        let table = tables
            .create(&rid, DiningTableCreate {
                name: "T1".to_string(),
            })
            .await
            .unwrap();
        let tid = table.id.unwrap().to_string();
        (TokenService::new(db.db, feed), rid, tid)
    }

    #[tokio::test]
    async fn issue_then_validate_round_trips() {
        let (service, rid, tid) = setup().await;
        let issued = service.issue(&rid, &tid, "https://tavolo.example").await.unwrap();
        assert!(issued.redirect_url.contains(&format!("?token={}", issued.token)));
        assert_eq!(issued.token.len(), TOKEN_BYTES * 2); // hex

        let session = service.validate(&issued.token, &rid, &tid).await.unwrap();
        assert_eq!(session.restaurant_id, rid);
        assert_eq!(session.table_id, tid);
        assert_eq!(session.expires_at, issued.expires_at);
    }

    #[tokio::test]
    async fn new_issue_revokes_previous_tokens() {
        let (service, rid, tid) = setup().await;
        let first = service.issue(&rid, &tid, "http://localhost").await.unwrap();
        let second = service.issue(&rid, &tid, "http://localhost").await.unwrap();

        let err = service.validate(&first.token, &rid, &tid).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::TokenInvalid(TokenRejection::Revoked)
        ));
        // The replacement stays valid
        assert!(service.validate(&second.token, &rid, &tid).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let (service, rid, tid) = setup().await;
        let err = service
            .validate("deadbeefdeadbeefdeadbeefdeadbeef", &rid, &tid)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::TokenInvalid(TokenRejection::NotFound)
        ));
    }

    #[tokio::test]
    async fn token_is_bound_to_its_restaurant_and_table() {
        let (service, rid, tid) = setup().await;
        let issued = service.issue(&rid, &tid, "http://localhost").await.unwrap();

        let err = service
            .validate(&issued.token, "restaurants:somewhere_else", &tid)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::TokenInvalid(TokenRejection::RestaurantMismatch)
        ));

        let err = service
            .validate(&issued.token, &rid, "tables:another_table")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::TokenInvalid(TokenRejection::TableMismatch)
        ));
    }

    #[tokio::test]
    async fn revoke_all_is_idempotent_and_kills_validation() {
        let (service, rid, tid) = setup().await;
        let issued = service.issue(&rid, &tid, "http://localhost").await.unwrap();

        assert_eq!(service.revoke_all_for_table(&rid, &tid).await.unwrap(), 1);
        assert_eq!(service.revoke_all_for_table(&rid, &tid).await.unwrap(), 0);

        let err = service.validate(&issued.token, &rid, &tid).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::TokenInvalid(TokenRejection::Revoked)
        ));
    }

    #[tokio::test]
    async fn concurrent_issues_leave_a_single_live_token() {
        let (service, rid, tid) = setup().await;

        let mut handles = Vec::new();
        for _ in 0..4 {
            let service = service.clone();
            let (rid, tid) = (rid.clone(), tid.clone());
            handles.push(tokio::spawn(async move {
                service.issue(&rid, &tid, "http://localhost").await
            }));
        }
        let mut tokens = Vec::new();
        for handle in handles {
            tokens.push(handle.await.unwrap().unwrap().token);
        }

        // Exactly one of the issued tokens survives
        let mut live = 0;
        for token in &tokens {
            if service.validate(token, &rid, &tid).await.is_ok() {
                live += 1;
            }
        }
        assert_eq!(live, 1);
    }
}
