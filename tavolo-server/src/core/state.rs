//! Server state
//!
//! 持有所有服务的共享引用。使用 Arc/浅拷贝，所有权成本极低。

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::orders::OrderWorkflow;
use crate::realtime::ChangeFeed;
use crate::session::{SessionGate, TokenService};

/// 服务器状态 - 持有所有服务的单例引用
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | 嵌入式数据库 (SurrealDB) |
/// | jwt_service | 员工 JWT 认证 |
/// | feed | 变更推送 (refetch-on-event) |
/// | tokens | 桌台令牌生命周期 |
/// | gate | 顾客会话门禁 |
/// | workflow | 订单状态机 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    pub feed: ChangeFeed,
    pub tokens: TokenService,
    pub gate: SessionGate,
    pub workflow: OrderWorkflow,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 打开数据库 (work_dir/database)、应用 schema、装配服务。
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        let db_service = DbService::open(&config.work_dir).await?;
        Ok(Self::assemble(config.clone(), db_service))
    }

    /// 基于内存数据库初始化 (测试)
    pub async fn initialize_in_memory(config: &Config) -> anyhow::Result<Self> {
        let db_service = DbService::open_memory().await?;
        Ok(Self::assemble(config.clone(), db_service))
    }

    fn assemble(config: Config, db_service: DbService) -> Self {
        let db = db_service.db;
        let feed = ChangeFeed::new();
        let tokens = TokenService::new(db.clone(), feed.clone());
        let gate = SessionGate::new(db.clone(), tokens.clone());
        let workflow = OrderWorkflow::new(db.clone(), tokens.clone(), feed.clone());
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));

        Self {
            config,
            db,
            jwt_service,
            feed,
            tokens,
            gate,
            workflow,
        }
    }
}
