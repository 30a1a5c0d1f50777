//! Orders domain
//!
//! # 结构
//!
//! - [`cart`] — 购物车：定价模式 (标准 / AYCE)、限购规则、合计计算
//! - [`edit`] — 员工改单：改量、加减行、重算合计
//! - [`workflow`] — 状态机：pending → preparing → ready → served → paid

pub mod cart;
pub mod edit;
pub mod workflow;

pub use cart::{CartError, OrderCart, PricingMode};
pub use edit::{AppliedEdit, apply_edit};
pub use workflow::{OrderWorkflow, role_may_advance, role_may_settle};
