//! API 路由模块
//!
//! # 结构
//!
//! 顾客侧（桌台令牌门禁）：
//! - [`qr`] - 扫码发放令牌（匿名）
//! - [`menu`] - 顾客菜单
//! - [`session`] - 会话校验与就餐人数
//! - [`orders`] - 下单（顾客）/ 订单管理（员工）
//! - [`waiter_calls`] - 呼叫服务员
//!
//! 员工侧（JWT 门禁）：
//! - [`auth`] - 员工登录
//! - [`kitchen_orders`] - 厨房工作台
//! - [`tables`] - 桌台管理与关台结账
//! - [`products`] - 菜单管理
//! - [`events`] - SSE 变更推送
//! - [`health`] - 健康检查

pub mod convert;

pub mod auth;
pub mod events;
pub mod health;
pub mod kitchen_orders;
pub mod menu;
pub mod orders;
pub mod products;
pub mod qr;
pub mod session;
pub mod tables;
pub mod waiter_calls;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
