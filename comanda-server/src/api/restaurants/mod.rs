//! Restaurant API 模块
//!
//! 自己的餐厅资源 (token) + 扫码点餐的公开路由。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest(
            "/api/restaurant",
            Router::new().route(
                "/",
                get(handler::get_own)
                    .post(handler::create_own)
                    .put(handler::update_own)
                    .delete(handler::delete_own),
            ),
        )
        // Public QR-ordering surface (auth middleware allow-lists these)
        .route("/api/restaurants/{id}/menu", get(handler::menu_preview))
        .route(
            "/api/restaurants/{id}/submit-order",
            post(handler::submit_order),
        )
}
