//! Database Module
//!
//! Owns the embedded SurrealDB handle and applies the schema at open time.
//! Record links are stored and compared as `"table:id"` strings; all
//! timestamps are unix millis.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

/// Idempotent schema statements applied on every open
///
/// The stored `fn::validate_table_token` function is the sanctioned token
/// lookup: handlers never scan `table_tokens` directly. It returns the
/// matching row including the `revoked`/`expires_at` flags so the caller can
/// classify the rejection reason.
const SCHEMA: &[&str] = &[
    "DEFINE INDEX OVERWRITE uniq_table_tokens_token ON TABLE table_tokens FIELDS token UNIQUE",
    "DEFINE INDEX OVERWRITE idx_table_tokens_table ON TABLE table_tokens FIELDS restaurant_id, table_id",
    "DEFINE INDEX OVERWRITE uniq_employees_username ON TABLE employees FIELDS username UNIQUE",
    "DEFINE INDEX OVERWRITE idx_orders_restaurant ON TABLE orders FIELDS restaurant_id",
    "DEFINE INDEX OVERWRITE idx_orders_table ON TABLE orders FIELDS restaurant_id, table_id",
    "DEFINE INDEX OVERWRITE idx_order_items_order ON TABLE order_items FIELDS order_id",
    "DEFINE INDEX OVERWRITE idx_waiter_calls_restaurant ON TABLE waiter_calls FIELDS restaurant_id, status",
    "DEFINE FUNCTION OVERWRITE fn::validate_table_token($token: string) {
        RETURN SELECT * FROM table_tokens WHERE token = $token LIMIT 1;
    }",
];

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open the on-disk database under `{work_dir}/database`
    pub async fn open(work_dir: &str) -> Result<Self, AppError> {
        let path = format!("{}/database", work_dir);
        let db = Surreal::new::<RocksDb>(path.as_str())
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {}", e)))?;
        Self::init(db).await
    }

    /// Open an in-memory database (tests)
    pub async fn open_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open memory database: {}", e)))?;
        Self::init(db).await
    }

    async fn init(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns("tavolo")
            .use_db("tavolo")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;

        for statement in SCHEMA {
            db.query(*statement)
                .await
                .map_err(|e| AppError::database(format!("Schema statement failed: {}", e)))?;
        }
        tracing::info!("Database schema applied");

        Ok(Self { db })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_is_idempotent_across_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path().to_str().unwrap().to_string();

        let service = DbService::open(&work_dir).await.unwrap();
        drop(service);
        // Re-opening re-applies every DEFINE without error
        DbService::open(&work_dir).await.unwrap();
    }

    #[tokio::test]
    async fn stored_token_function_exists() {
        let service = DbService::open_memory().await.unwrap();
        let mut result = service
            .db
            .query("RETURN fn::validate_table_token('missing')")
            .await
            .unwrap();
        let rows: Vec<serde_json::Value> = result.take(0).unwrap();
        assert!(rows.is_empty());
    }
}
