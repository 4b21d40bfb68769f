//! Listing repository

use crate::{
    error::AppError,
    models::listing::{Listing, ListingPatch, NewListing, Quality},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn create(&self, listing: NewListing) -> Result<Listing, AppError>;

    /// 按添加时间倒序
    async fn list(&self) -> Result<Vec<Listing>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>, AppError>;

    /// 查找同名、同价、同卖家、同颜色的商品
    async fn find_duplicate(
        &self,
        name: &str,
        price: f64,
        seller: &str,
        color: Option<&str>,
    ) -> Result<Option<Listing>, AppError>;

    /// 在单条语句内应用修改，未提供的字段保持原值（added_by 不可修改）
    async fn update(&self, id: Uuid, patch: &ListingPatch) -> Result<Option<Listing>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: Uuid,
    name: String,
    images: Vec<String>,
    price: f64,
    seller: String,
    seller_phone: String,
    place: String,
    quality: String,
    added_by: Uuid,
    added_date: DateTime<Utc>,
    color: Option<String>,
    category: String,
    curved: bool,
    multifunctional: bool,
}

impl TryFrom<ListingRow> for Listing {
    type Error = AppError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let quality = row
            .quality
            .parse::<Quality>()
            .map_err(|_| AppError::Internal(format!("Unknown quality stored: {}", row.quality)))?;

        Ok(Listing {
            id: row.id,
            name: row.name,
            images: row.images,
            price: row.price,
            seller: row.seller,
            seller_phone: row.seller_phone,
            place: row.place,
            quality,
            added_by: row.added_by,
            added_date: row.added_date,
            color: row.color,
            category: row.category,
            curved: row.curved,
            multifunctional: row.multifunctional,
        })
    }
}

pub struct PgListingRepository {
    db: PgPool,
}

impl PgListingRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ListingRepository for PgListingRepository {
    async fn create(&self, listing: NewListing) -> Result<Listing, AppError> {
        let row = sqlx::query_as::<_, ListingRow>(
            r#"
            INSERT INTO listings
                (id, name, images, price, seller, seller_phone, place, quality,
                 added_by, color, category, curved, multifunctional)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&listing.name)
        .bind(&listing.images)
        .bind(listing.price)
        .bind(&listing.seller)
        .bind(&listing.seller_phone)
        .bind(&listing.place)
        .bind(listing.quality.as_str())
        .bind(listing.added_by)
        .bind(&listing.color)
        .bind(&listing.category)
        .bind(listing.curved)
        .bind(listing.multifunctional)
        .fetch_one(&self.db)
        .await?;

        Listing::try_from(row)
    }

    async fn list(&self) -> Result<Vec<Listing>, AppError> {
        let rows = sqlx::query_as::<_, ListingRow>("SELECT * FROM listings ORDER BY added_date DESC")
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(Listing::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
        let row = sqlx::query_as::<_, ListingRow>("SELECT * FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.map(Listing::try_from).transpose()
    }

    async fn find_duplicate(
        &self,
        name: &str,
        price: f64,
        seller: &str,
        color: Option<&str>,
    ) -> Result<Option<Listing>, AppError> {
        let row = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT * FROM listings
            WHERE name = $1
              AND price = $2
              AND seller = $3
              AND color IS NOT DISTINCT FROM $4
            LIMIT 1
            "#,
        )
        .bind(name)
        .bind(price)
        .bind(seller)
        .bind(color)
        .fetch_optional(&self.db)
        .await?;

        row.map(Listing::try_from).transpose()
    }

    async fn update(&self, id: Uuid, patch: &ListingPatch) -> Result<Option<Listing>, AppError> {
        // 逐列 COALESCE，并发编辑不同字段时互不覆盖
        let row = sqlx::query_as::<_, ListingRow>(
            r#"
            UPDATE listings
            SET
                name = COALESCE($2, name),
                images = COALESCE($3, images),
                price = COALESCE($4, price),
                seller = COALESCE($5, seller),
                seller_phone = COALESCE($6, seller_phone),
                place = COALESCE($7, place),
                quality = COALESCE($8, quality),
                color = CASE WHEN $9 THEN $10 ELSE color END,
                category = COALESCE($11, category),
                curved = COALESCE($12, curved),
                multifunctional = COALESCE($13, multifunctional)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.images)
        .bind(patch.price)
        .bind(&patch.seller)
        .bind(&patch.seller_phone)
        .bind(&patch.place)
        .bind(patch.quality.map(|q| q.as_str()))
        .bind(patch.color.is_some())
        .bind(patch.color.clone().flatten())
        .bind(&patch.category)
        .bind(patch.curved)
        .bind(patch.multifunctional)
        .fetch_optional(&self.db)
        .await?;

        row.map(Listing::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
