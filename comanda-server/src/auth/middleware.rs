//! 认证中间件
//!
//! 为 JWT 认证提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展 (`req.extensions_mut().insert(user)`)。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径
/// - `/api/auth/register`、`/api/auth/login` (注册/登录)
/// - `/api/health` (健康检查)
/// - `/api/images/*` (公开图片)
/// - `/api/restaurants/{id}/menu`、`/api/restaurants/{id}/submit-order`
///   (扫码点餐的公开接口)
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证 (让它们正常返回 404)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if is_public_api_route(path) {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    // 验证令牌
    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims)
                .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// 公共 API 路由 (无需令牌)
fn is_public_api_route(path: &str) -> bool {
    if path == "/api/auth/register" || path == "/api/auth/login" || path == "/api/health" {
        return true;
    }
    if path.starts_with("/api/images/") {
        return true;
    }
    // QR ordering: GET menu and submit-order under /api/restaurants/{id}/
    if let Some(rest) = path.strip_prefix("/api/restaurants/") {
        let mut parts = rest.split('/');
        let id = parts.next().unwrap_or("");
        let tail = parts.next().unwrap_or("");
        let no_more = parts.next().is_none();
        if id.chars().all(|c| c.is_ascii_digit())
            && !id.is_empty()
            && no_more
            && (tail == "menu" || tail == "submit-order")
        {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_routes() {
        assert!(is_public_api_route("/api/auth/login"));
        assert!(is_public_api_route("/api/auth/register"));
        assert!(is_public_api_route("/api/health"));
        assert!(is_public_api_route("/api/images/items/abc.jpg"));
        assert!(is_public_api_route("/api/restaurants/12/menu"));
        assert!(is_public_api_route("/api/restaurants/12/submit-order"));
    }

    #[test]
    fn test_protected_routes() {
        assert!(!is_public_api_route("/api/orders"));
        assert!(!is_public_api_route("/api/restaurants/12/secrets"));
        assert!(!is_public_api_route("/api/restaurants/abc/menu"));
        assert!(!is_public_api_route("/api/restaurants//menu"));
        assert!(!is_public_api_route("/api/restaurants/12/menu/extra"));
    }
}
