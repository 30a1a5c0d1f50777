//! Authentication Handlers

use std::time::Duration;

use axum::{Json, extract::State};
use shared::client::{LoginRequest, LoginResponse, StaffInfo};

use crate::core::ServerState;
use crate::db::repository::EmployeeRepository;
use crate::utils::AppError;

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/auth/login - 员工登录
///
/// Authenticates staff credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let repo = EmployeeRepository::new(state.db.clone());
    let employee = repo.find_by_username(&req.username).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent username enumeration
    let employee = match employee {
        Some(e) => {
            if !e.is_active {
                return Err(AppError::forbidden("Account has been disabled".to_string()));
            }
            let password_valid = e
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
            if !password_valid {
                tracing::warn!(username = %req.username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }
            e
        }
        None => {
            tracing::warn!(username = %req.username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let employee_id = employee
        .id
        .as_ref()
        .map(|id| id.to_string())
        .ok_or_else(|| AppError::internal("Employee has no id"))?;
    let restaurant_id = employee.restaurant_id.as_ref().map(|id| id.to_string());

    let token = state
        .jwt_service
        .generate_token(
            &employee_id,
            &employee.username,
            employee.role,
            restaurant_id.clone(),
        )
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;

    tracing::info!(username = %employee.username, role = %employee.role, "Staff login");

    Ok(Json(LoginResponse {
        token,
        staff: StaffInfo {
            id: employee_id,
            username: employee.username,
            display_name: employee.display_name,
            role: employee.role,
            restaurant_id,
        },
    }))
}
