//! HTTP 服务器启动与关闭

use std::net::SocketAddr;

use crate::api;
use crate::core::{Config, ServerState};

/// HTTP 服务器
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    /// 使用已初始化的状态创建服务器
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    /// 运行 HTTP 服务器，直到收到关闭信号
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = api::build_app(&self.state).with_state(self.state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// 等待 Ctrl+C 关闭信号
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
