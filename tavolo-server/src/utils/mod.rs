//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`AppResponse`] - API 响应结构
//! - 日志、校验等工具

pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::{AppError, AppResponse};
pub use error::{ok, ok_with_message};
pub use result::AppResult;

/// Current unix time in milliseconds
///
/// All persisted timestamps use unix millis; conversion to wall-clock time
/// happens at the client.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
