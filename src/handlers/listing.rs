//! 商品的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    extract::AppJson,
    middleware::AppState,
    models::listing::{CreateListingRequest, UpdateListingRequest},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound)
}

/// 商品列表（最新在前）
pub async fn list_listings(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let listings = state.listing_service.list().await?;

    Ok(Json(json!({"success": true, "data": listings})))
}

/// 新增商品
pub async fn add_listing(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    AppJson(req): AppJson<CreateListingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let listing = state.listing_service.add(&auth_context, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "data": listing})),
    ))
}

/// 编辑商品
pub async fn edit_listing(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateListingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let listing = state
        .listing_service
        .edit(&auth_context, parse_id(&id)?, req)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Item updated successfully",
        "data": listing
    })))
}

/// 删除商品
pub async fn delete_listing(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .listing_service
        .delete(&auth_context, parse_id(&id)?)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Item deleted successfully"
    })))
}
