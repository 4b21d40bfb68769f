//! 账户查询的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext, error::AppError, middleware::AppState,
    models::account::AccountResponse,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// 列出账户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let accounts = state.accounts.list().await?;

    let responses: Vec<AccountResponse> = accounts.into_iter().map(AccountResponse::from).collect();

    Ok(Json(responses))
}

/// 获取账户详情；无法解析的 ID 同样视为不存在
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound)?;

    let account = state
        .accounts
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(AccountResponse::from(account)))
}
