//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{handlers, middleware::AppState, uploads::PUBLIC_PREFIX};

/// multipart 表单中除文件外的额外余量
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let jwt_service = state.jwt_service.clone();

    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需访问令牌）
    let auth_routes = Router::new()
        .route(
            "/api/employers/register",
            post(handlers::auth::register).layer(DefaultBodyLimit::max(
                state.uploads.max_bytes() + FORM_OVERHEAD_BYTES,
            )),
        )
        .route("/api/employers/login", post(handlers::auth::login))
        .route("/api/employers/refresh-token", post(handlers::auth::refresh_token))
        .route("/api/employers/logout", post(handlers::auth::logout));

    // 需要访问令牌的路由
    let authenticated_routes = Router::new()
        .route("/api/employers/users", get(handlers::user::list_users))
        .route("/api/employers/users/{id}", get(handlers::user::get_user))
        .route("/api/items", get(handlers::listing::list_listings))
        .route("/api/items/add", post(handlers::listing::add_listing))
        .route(
            "/api/items/{id}",
            put(handlers::listing::edit_listing).delete(handlers::listing::delete_listing),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_service,
            crate::auth::middleware::jwt_auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(authenticated_routes)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(state.uploads.dir()))
        .layer(cors_layer(&state.config.server.cors_origin))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}

/// 单一前端来源，允许携带 cookie
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin = %origin, "Invalid CORS origin, cross-origin requests disabled");
            layer
        }
    }
}
