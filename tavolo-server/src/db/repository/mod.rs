//! Repository Module
//!
//! Provides CRUD operations over the SurrealDB tables. One repository per
//! logical table, all built on [`BaseRepository`].

// Tenancy
pub mod restaurant;

// Auth
pub mod employee;

// Menu
pub mod category;
pub mod product;

// Location
pub mod dining_table;

// Sessions
pub mod table_token;

// Orders
pub mod order;

// Service requests
pub mod waiter_call;

// Re-exports
pub use category::CategoryRepository;
pub use dining_table::DiningTableRepository;
pub use employee::EmployeeRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use restaurant::RestaurantRepository;
pub use table_token::TableTokenRepository;
pub use waiter_call::WaiterCallRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for crate::utils::AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => crate::utils::AppError::NotFound(msg),
            RepoError::Duplicate(msg) => crate::utils::AppError::Conflict(msg),
            RepoError::Validation(msg) => crate::utils::AppError::Validation(msg),
            RepoError::Database(msg) => crate::utils::AppError::Database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 行自身的 id 使用 surrealdb::RecordId；模型里的链接字段 (restaurant_id,
// table_id, order_id, ...) 序列化为 "table:id" 字符串，查询时按字符串比较。

/// Parse a `"table:id"` string into a RecordId
pub fn parse_record_id(id: &str, what: &str) -> RepoResult<surrealdb::RecordId> {
    id.parse()
        .map_err(|_| RepoError::Validation(format!("Invalid {} ID: {}", what, id)))
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
