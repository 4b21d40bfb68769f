//! Authentication-related models

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::account::{AccountResponse, Role};

/// Registration form (multipart text fields)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "is required (max 100 characters)"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "is required (max 20 characters)"))]
    pub phone: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
    pub role: Option<Role>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login response; the refresh token travels in a cookie
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: AccountResponse,
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// Result of a successful login before it is split into body and cookie
#[derive(Debug)]
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AccountResponse,
}
