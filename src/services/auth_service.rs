//! 认证服务：注册、登录、令牌刷新

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher},
    error::AppError,
    models::{
        account::{normalize_email, AccountResponse, NewAccount},
        auth::{LoginOutcome, LoginRequest, RegisterRequest},
    },
    repository::AccountRepository,
    uploads::UploadStore,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Uploaded profile image, not yet stored
#[derive(Debug)]
pub struct ProfileImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct AuthService {
    accounts: Arc<dyn AccountRepository>,
    jwt_service: Arc<JwtService>,
    hasher: PasswordHasher,
    uploads: Arc<UploadStore>,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        jwt_service: Arc<JwtService>,
        hasher: PasswordHasher,
        uploads: Arc<UploadStore>,
    ) -> Self {
        Self {
            accounts,
            jwt_service,
            hasher,
            uploads,
        }
    }

    /// 注册雇主账户
    pub async fn register(
        &self,
        req: RegisterRequest,
        profile_image: Option<ProfileImage>,
    ) -> Result<AccountResponse, AppError> {
        req.validate()?;
        self.hasher.validate_password_policy(&req.password)?;

        let email = normalize_email(&req.email);
        if self.accounts.find_by_email(&email).await?.is_some() {
            tracing::info!("Registration rejected: email already registered");
            return Err(AppError::DuplicateAccount);
        }

        let password_hash = self.hasher.hash_blocking(req.password).await?;

        // 图片在所有校验通过后才落盘
        let profile_image_url = match profile_image {
            Some(image) => Some(self.uploads.save(&image.file_name, &image.bytes).await?),
            None => None,
        };

        let created = self
            .accounts
            .create(NewAccount {
                name: req.name,
                phone: req.phone,
                email,
                password_hash,
                role: req.role.unwrap_or_default(),
                profile_image_url: profile_image_url.clone(),
            })
            .await;

        // 并发注册时唯一索引可能在此处拒绝，已写入的图片随之删除
        let account = match created {
            Ok(account) => account,
            Err(e) => {
                if let Some(reference) = &profile_image_url {
                    self.uploads.remove(reference).await;
                }
                return Err(e);
            }
        };

        tracing::info!(account_id = %account.id, role = %account.role, "Account registered");

        Ok(AccountResponse::from(account))
    }

    /// 登录：校验凭证并签发访问令牌与刷新令牌
    ///
    /// 邮箱不存在与密码错误返回同一个错误。
    pub async fn login(&self, req: LoginRequest) -> Result<LoginOutcome, AppError> {
        if req.email.trim().is_empty() || req.password.is_empty() {
            return Err(AppError::Validation("Email and password are required".to_string()));
        }

        let account = self.accounts.find_by_email(&req.email).await?;

        let verified = self
            .hasher
            .verify_blocking(req.password, account.as_ref().map(|a| a.password_hash.clone()))
            .await;

        let mut account = match (verified, account) {
            (Ok(()), Some(account)) => account,
            (Err(AppError::InvalidCredentials), _) | (Ok(()), None) => {
                tracing::warn!("Login failed: invalid credentials");
                return Err(AppError::InvalidCredentials);
            }
            (Err(e), _) => return Err(e),
        };

        let now = Utc::now();
        self.accounts.record_login(account.id, now).await?;
        account.last_login = Some(now);

        let access_token = self.jwt_service.generate_access_token(&account)?;
        let refresh_token = self.jwt_service.generate_refresh_token(&account)?;

        tracing::info!(account_id = %account.id, "Login successful");

        Ok(LoginOutcome {
            access_token,
            refresh_token,
            user: AccountResponse::from(account),
        })
    }

    /// 用刷新令牌换取新的访问令牌
    ///
    /// 先校验签名与过期时间，再查询账户；刷新令牌本身不轮换。
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<String, AppError> {
        let refresh_token = refresh_token.ok_or(AppError::MissingToken)?;

        let claims = self.jwt_service.validate_refresh_token(refresh_token)?;
        let account_id =
            Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidRefreshToken)?;

        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AppError::AccountNotFound)?;

        let token = self.jwt_service.generate_access_token(&account)?;

        tracing::info!(account_id = %account.id, "Access token refreshed");

        Ok(token)
    }

    /// Refresh cookie lifetime in seconds
    pub fn refresh_token_max_age(&self) -> u64 {
        self.jwt_service.refresh_token_exp_secs()
    }
}
