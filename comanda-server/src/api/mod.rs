//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口 (注册/登录)
//! - [`restaurants`] - 餐厅管理 + 公开菜单/扫码下单
//! - [`categories`] - 分类管理接口
//! - [`items`] - 菜品管理接口
//! - [`tables`] - 桌台管理接口
//! - [`orders`] - 订单管理接口
//! - [`order_history`] - 订单归档查询
//! - [`statistics`] - 销量统计接口
//! - [`reports`] - 销售报表接口
//! - [`images`] - 公开图片服务

pub mod form;
pub mod scope;

pub mod auth;
pub mod health;
pub mod images;

// Data models API
pub mod categories;
pub mod items;
pub mod order_history;
pub mod orders;
pub mod reports;
pub mod restaurants;
pub mod statistics;
pub mod tables;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Auth API - register/login public, /me authenticated
        .merge(auth::router())
        // Restaurant API - own-restaurant CRUD + public QR-ordering routes
        .merge(restaurants::router())
        // Menu catalog API - authentication required
        .merge(categories::router())
        .merge(items::router())
        // Table API - authentication required
        .merge(tables::router())
        // Order API - authentication required
        .merge(orders::router())
        .merge(order_history::router())
        // Statistics API - authentication required
        .merge(statistics::router())
        .merge(reports::router())
        // Image serving - public route
        .merge(images::router())
        // Health API - public route
        .merge(health::router())
}

/// Build a fully configured application with all middleware and state
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        // ========== Tower HTTP Middleware ==========
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // ========== Application Middleware ==========
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // Get user context (JWT authentication) - executes before routes, injects CurrentUser
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ))
}
