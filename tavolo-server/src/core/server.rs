//! Server Implementation
//!
//! HTTP 服务器启动和路由装配

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::core::{Config, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (tests, embedded use)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// 装配全部路由
    ///
    /// 公开面（匿名/桌台令牌门禁）和员工面（JWT 门禁）分开合并；
    /// 员工面的每个模块自带 `require_auth` 中间件。
    pub fn build_router(state: ServerState) -> Router {
        let public = Router::new()
            .merge(api::qr::router())
            .merge(api::health::router())
            .merge(api::auth::router())
            .merge(api::menu::router())
            .merge(api::session::router())
            .merge(api::orders::customer_router())
            .merge(api::waiter_calls::customer_router());

        let staff = Router::new()
            .merge(api::orders::staff_router(state.clone()))
            .merge(api::kitchen_orders::router(state.clone()))
            .merge(api::waiter_calls::staff_router(state.clone()))
            .merge(api::tables::router(state.clone()))
            .merge(api::products::router(state.clone()))
            .merge(api::events::router(state.clone()));

        public
            .merge(staff)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let router = Self::build_router(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("Tavolo server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await?;

        Ok(())
    }
}
