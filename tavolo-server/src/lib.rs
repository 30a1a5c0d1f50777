//! Tavolo Server - 扫码点餐平台服务端
//!
//! # 架构概述
//!
//! 本模块是 Tavolo 服务端的主入口，提供以下核心功能：
//!
//! - **桌台会话** (`session`): 扫码令牌的发放、校验、吊销
//! - **订单** (`orders`): 购物车定价 (标准/AYCE)、状态机工作流
//! - **变更推送** (`realtime`): refetch-on-event 的变更通知
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **认证** (`auth`): 员工 JWT + Argon2
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! tavolo-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、角色
//! ├── session/       # 桌台令牌与会话门禁
//! ├── orders/        # 购物车、改单、状态机
//! ├── realtime/      # 变更推送
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod realtime;
pub mod session;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentStaff, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::{OrderCart, OrderWorkflow, PricingMode};
pub use realtime::ChangeFeed;
pub use session::{SessionGate, TokenService};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() {
    let _ = dotenv::dotenv();
    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}
