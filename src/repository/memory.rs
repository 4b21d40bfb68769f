//! In-memory repositories
//! Used by the test suite and for running the API without PostgreSQL.

use crate::{
    db::HealthStatus,
    error::AppError,
    models::{
        account::{normalize_email, Account, NewAccount, Role},
        listing::{Listing, ListingPatch, NewListing},
    },
    repository::{AccountRepository, ListingRepository},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryAccountRepository {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop an account. There is no deletion route; tests use this to
    /// simulate an account removed after its tokens were issued.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.accounts.write().await.remove(&id).is_some()
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let email = normalize_email(email);
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn create(&self, account: NewAccount) -> Result<Account, AppError> {
        let email = normalize_email(&account.email);
        // 持有写锁完成检查与插入
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == email) {
            return Err(AppError::DuplicateAccount);
        }

        let now = Utc::now();
        let created = Account {
            id: Uuid::new_v4(),
            name: account.name.trim().to_string(),
            phone: account.phone.trim().to_string(),
            email,
            password_hash: account.password_hash,
            role: account.role,
            profile_image_url: account.profile_image_url,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        if let Some(account) = self.accounts.write().await.get_mut(&id) {
            account.last_login = Some(at);
            account.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<Option<Account>, AppError> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts.get_mut(&id).map(|account| {
            account.role = role;
            account.updated_at = Utc::now();
            account.clone()
        }))
    }

    async fn list(&self) -> Result<Vec<Account>, AppError> {
        let mut accounts: Vec<Account> = self.accounts.read().await.values().cloned().collect();
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts)
    }

    async fn health_check(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
}

#[derive(Default)]
pub struct MemoryListingRepository {
    listings: RwLock<HashMap<Uuid, Listing>>,
}

impl MemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingRepository for MemoryListingRepository {
    async fn create(&self, listing: NewListing) -> Result<Listing, AppError> {
        let created = Listing {
            id: Uuid::new_v4(),
            name: listing.name,
            images: listing.images,
            price: listing.price,
            seller: listing.seller,
            seller_phone: listing.seller_phone,
            place: listing.place,
            quality: listing.quality,
            added_by: listing.added_by,
            added_date: Utc::now(),
            color: listing.color,
            category: listing.category,
            curved: listing.curved,
            multifunctional: listing.multifunctional,
        };
        self.listings.write().await.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Listing>, AppError> {
        let mut listings: Vec<Listing> = self.listings.read().await.values().cloned().collect();
        listings.sort_by(|a, b| b.added_date.cmp(&a.added_date));
        Ok(listings)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
        Ok(self.listings.read().await.get(&id).cloned())
    }

    async fn find_duplicate(
        &self,
        name: &str,
        price: f64,
        seller: &str,
        color: Option<&str>,
    ) -> Result<Option<Listing>, AppError> {
        let listings = self.listings.read().await;
        Ok(listings
            .values()
            .find(|l| {
                l.name == name && l.price == price && l.seller == seller && l.color.as_deref() == color
            })
            .cloned())
    }

    async fn update(&self, id: Uuid, patch: &ListingPatch) -> Result<Option<Listing>, AppError> {
        // 持有写锁完成读取、修改与写回
        let mut listings = self.listings.write().await;
        Ok(listings.get_mut(&id).map(|stored| {
            patch.apply_to(stored);
            stored.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.listings.write().await.remove(&id).is_some())
    }
}
