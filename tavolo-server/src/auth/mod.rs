//! 认证模块 - 员工 JWT 认证
//!
//! - [`JwtService`] / [`JwtConfig`] — 令牌生成与验证
//! - [`require_auth`] — Axum 中间件
//! - [`CurrentStaff`] — 已认证员工信息 (注入请求扩展)
//!
//! 角色能力（厨房只能推进 开始制作/出餐 两步）在订单工作流中强制执行，
//! 而不是只靠前端隐藏按钮。

pub mod jwt;
pub mod middleware;

pub use jwt::{JwtConfig, JwtError, JwtService, StaffClaims};
pub use middleware::require_auth;

use crate::utils::{AppError, AppResult};
use shared::StaffRole;

/// 已认证的员工
#[derive(Debug, Clone)]
pub struct CurrentStaff {
    pub id: String,
    pub username: String,
    pub role: StaffRole,
    /// 所属餐厅；平台管理员为 None
    pub restaurant_id: Option<String>,
}

impl CurrentStaff {
    /// The restaurant this staff member operates on
    ///
    /// Every staff endpoint is tenant-scoped; a platform admin without a
    /// restaurant binding cannot use them.
    pub fn restaurant_id(&self) -> AppResult<&str> {
        self.restaurant_id
            .as_deref()
            .ok_or_else(|| AppError::forbidden("Account is not bound to a restaurant".to_string()))
    }

    /// Tenancy check against a row's restaurant
    pub fn ensure_same_restaurant(&self, restaurant_id: &str) -> AppResult<()> {
        let own = self.restaurant_id()?;
        if own != restaurant_id {
            return Err(AppError::forbidden(
                "Resource belongs to a different restaurant".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<StaffClaims> for CurrentStaff {
    fn from(claims: StaffClaims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
            restaurant_id: claims.restaurant_id,
        }
    }
}
