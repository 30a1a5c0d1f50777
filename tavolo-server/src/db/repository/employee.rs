//! Employee Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Employee, EmployeeCreate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct EmployeeRepository {
    base: BaseRepository,
}

impl EmployeeRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find employee by username
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<Employee>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM employees WHERE username = $username LIMIT 1")
            .bind(("username", username.to_string()))
            .await?;
        let employees: Vec<Employee> = result.take(0)?;
        Ok(employees.into_iter().next())
    }

    /// Create a staff account for a restaurant
    pub async fn create(
        &self,
        restaurant_id: Option<&str>,
        data: EmployeeCreate,
    ) -> RepoResult<Employee> {
        if self.find_by_username(&data.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                data.username
            )));
        }

        // Reject malformed restaurant ids before writing
        if let Some(id) = restaurant_id {
            parse_record_id(id, "restaurant")?;
        }
        let hash_pass = Employee::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Password hashing failed: {}", e)))?;

        // hash_pass is skip_serializing on the model (never leaves the API),
        // so the row is created with an explicit statement
        let mut result = self
            .base
            .db()
            .query(
                "CREATE employees CONTENT { username: $username, display_name: $display_name, \
                 hash_pass: $hash_pass, role: $role, restaurant_id: $rid, is_active: true }",
            )
            .bind(("username", data.username))
            .bind(("display_name", data.display_name))
            .bind(("hash_pass", hash_pass))
            .bind(("role", data.role))
            .bind(("rid", restaurant_id.map(|s| s.to_string())))
            .await?;
        let created: Vec<Employee> = result.take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create employee".to_string()))
    }
}
