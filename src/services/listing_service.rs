//! 商品服务：增删改查与归属校验

use crate::{
    auth::{middleware::AuthContext, policy::authorize_mutation},
    error::AppError,
    models::listing::{CreateListingRequest, Listing, UpdateListingRequest},
    repository::ListingRepository,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct ListingService {
    listings: Arc<dyn ListingRepository>,
}

impl ListingService {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }

    /// 新增商品，归属于当前账户
    pub async fn add(
        &self,
        actor: &AuthContext,
        req: CreateListingRequest,
    ) -> Result<Listing, AppError> {
        let new_listing = req.into_new_listing(actor.account_id)?;

        if self
            .listings
            .find_duplicate(
                &new_listing.name,
                new_listing.price,
                &new_listing.seller,
                new_listing.color.as_deref(),
            )
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateListing);
        }

        let listing = self.listings.create(new_listing).await?;
        tracing::info!(listing_id = %listing.id, added_by = %listing.added_by, "Listing added");

        Ok(listing)
    }

    pub async fn list(&self) -> Result<Vec<Listing>, AppError> {
        self.listings.list().await
    }

    /// 编辑商品：仅所有者或管理员
    pub async fn edit(
        &self,
        actor: &AuthContext,
        id: Uuid,
        patch: UpdateListingRequest,
    ) -> Result<Listing, AppError> {
        let listing = self
            .listings
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        // 所有者不可修改，校验结果在写入时依然成立
        authorize_mutation(actor.account_id, &actor.role, listing.added_by)?;

        let patch = patch.into_patch()?;

        let updated = self
            .listings
            .update(id, &patch)
            .await?
            .ok_or(AppError::NotFound)?;

        tracing::info!(listing_id = %id, actor = %actor.account_id, "Listing updated");

        Ok(updated)
    }

    /// 删除商品：仅所有者或管理员
    pub async fn delete(&self, actor: &AuthContext, id: Uuid) -> Result<(), AppError> {
        let listing = self
            .listings
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        authorize_mutation(actor.account_id, &actor.role, listing.added_by)?;

        if !self.listings.delete(id).await? {
            return Err(AppError::NotFound);
        }

        tracing::info!(listing_id = %id, actor = %actor.account_id, "Listing deleted");

        Ok(())
    }
}
