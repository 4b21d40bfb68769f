//! Account repository (数据库访问层)

use crate::{
    db::HealthStatus,
    error::AppError,
    models::account::{normalize_email, Account, NewAccount, Role},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Persistence seam for employer accounts
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// 根据邮箱查找账户（大小写不敏感）
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;

    /// 根据 ID 查找账户
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;

    /// 创建账户，邮箱已存在时返回 DuplicateAccount
    async fn create(&self, account: NewAccount) -> Result<Account, AppError>;

    /// 更新最后登录时间
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError>;

    /// 修改角色
    async fn update_role(&self, id: Uuid, role: Role) -> Result<Option<Account>, AppError>;

    /// 列出所有账户
    async fn list(&self) -> Result<Vec<Account>, AppError>;

    /// 存储健康检查
    async fn health_check(&self) -> HealthStatus;
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    phone: String,
    email: String,
    password_hash: String,
    role: String,
    profile_image_url: Option<String>,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|_| AppError::Internal(format!("Unknown role stored: {}", row.role)))?;

        Ok(Account {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            password_hash: row.password_hash,
            role,
            profile_image_url: row.profile_image_url,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgAccountRepository {
    db: PgPool,
}

impl PgAccountRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT * FROM employer_accounts WHERE LOWER(email) = $1",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.db)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM employer_accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.map(Account::try_from).transpose()
    }

    async fn create(&self, account: NewAccount) -> Result<Account, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO employer_accounts
                (id, name, phone, email, password_hash, role, profile_image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account.name.trim())
        .bind(account.phone.trim())
        .bind(normalize_email(&account.email))
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(&account.profile_image_url)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            // 并发注册由唯一索引兜底
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::DuplicateAccount
            }
            other => AppError::Database(other),
        })?;

        Account::try_from(row)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE employer_accounts
            SET
                last_login = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<Option<Account>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            UPDATE employer_accounts
            SET
                role = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(&self.db)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Account>, AppError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            "SELECT * FROM employer_accounts ORDER BY created_at DESC",
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn health_check(&self) -> HealthStatus {
        crate::db::ping(&self.db).await
    }
}
