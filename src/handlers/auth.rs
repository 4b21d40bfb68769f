//! 认证相关的 HTTP 处理器

use crate::{
    auth::cookie::{clear_refresh_cookie, read_cookie, refresh_cookie, REFRESH_COOKIE},
    error::AppError,
    extract::AppJson,
    middleware::AppState,
    models::{
        account::Role,
        auth::{LoginRequest, LoginResponse, RefreshResponse, RegisterRequest},
    },
    services::ProfileImage,
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 注册（multipart 表单，可附带 profile_image）
pub async fn register(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut multipart = multipart?;
    let mut req = RegisterRequest::default();
    let mut profile_image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "profile_image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Invalid profile_image: {}", e)))?;
            if !bytes.is_empty() {
                profile_image = Some(ProfileImage {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid field '{}': {}", name, e)))?;

        match name.as_str() {
            "name" => req.name = value.trim().to_string(),
            "phone" => req.phone = value.trim().to_string(),
            "email" => req.email = value.trim().to_string(),
            "password" => req.password = value,
            "role" if !value.trim().is_empty() => req.role = Some(value.parse::<Role>()?),
            _ => {}
        }
    }

    state.auth_service.register(req, profile_image).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Employer user registered successfully"})),
    ))
}

/// 登录：响应体返回访问令牌，刷新令牌写入 HttpOnly cookie
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.auth_service.login(req).await?;

    let cookie = refresh_cookie(
        &outcome.refresh_token,
        state.auth_service.refresh_token_max_age(),
        state.config.server.is_production(),
    )?;

    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: "Login successful".to_string(),
            token: outcome.access_token,
            user: outcome.user,
        }),
    ))
}

/// 刷新访问令牌
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = read_cookie(&headers, REFRESH_COOKIE);

    let access_token = state.auth_service.refresh(token.as_deref()).await?;

    Ok(Json(RefreshResponse {
        token: access_token,
    }))
}

/// 登出：仅清除客户端 cookie，服务端不做吊销
pub async fn logout() -> impl IntoResponse {
    (
        [(SET_COOKIE, clear_refresh_cookie())],
        Json(json!({"message": "Logged out successfully"})),
    )
}
