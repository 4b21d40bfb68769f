//! Marketplace listing models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Condition grade of a listed item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Best,
    Good,
    Ok,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Best => "best",
            Quality::Good => "good",
            Quality::Ok => "ok",
        }
    }
}

impl FromStr for Quality {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best" => Ok(Quality::Best),
            "good" => Ok(Quality::Good),
            "ok" => Ok(Quality::Ok),
            other => Err(AppError::Validation(format!(
                "quality must be one of best, good, ok (got '{}')",
                other
            ))),
        }
    }
}

/// A listed item. `added_by` is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub name: String,
    pub images: Vec<String>,
    pub price: f64,
    pub seller: String,
    pub seller_phone: String,
    pub place: String,
    pub quality: Quality,
    pub added_by: Uuid,
    pub added_date: DateTime<Utc>,
    pub color: Option<String>,
    pub category: String,
    pub curved: bool,
    pub multifunctional: bool,
}

/// Add listing request. Everything is optional on the wire so that missing
/// fields can be reported together.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub seller: Option<String>,
    pub seller_phone: Option<String>,
    pub place: Option<String>,
    pub quality: Option<String>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub curved: Option<bool>,
    pub multifunctional: Option<bool>,
    pub images: Option<Vec<String>>,
}

/// Validated listing data ready to persist
#[derive(Debug, Clone)]
pub struct NewListing {
    pub name: String,
    pub images: Vec<String>,
    pub price: f64,
    pub seller: String,
    pub seller_phone: String,
    pub place: String,
    pub quality: Quality,
    pub added_by: Uuid,
    pub color: Option<String>,
    pub category: String,
    pub curved: bool,
    pub multifunctional: bool,
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl CreateListingRequest {
    /// Check required fields and build the record owned by `added_by`.
    pub fn into_new_listing(self, added_by: Uuid) -> Result<NewListing, AppError> {
        let name = present(&self.name);
        let price = self.price.filter(|p| *p > 0.0);
        let seller = present(&self.seller);
        let seller_phone = present(&self.seller_phone);
        let place = present(&self.place);
        let quality = present(&self.quality);
        let category = present(&self.category);

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("name");
        }
        if price.is_none() {
            missing.push("price");
        }
        if seller.is_none() {
            missing.push("seller");
        }
        if seller_phone.is_none() {
            missing.push("sellerPhone");
        }
        if place.is_none() {
            missing.push("place");
        }
        if quality.is_none() {
            missing.push("quality");
        }
        if category.is_none() {
            missing.push("category");
        }

        match (name, price, seller, seller_phone, place, quality, category) {
            (
                Some(name),
                Some(price),
                Some(seller),
                Some(seller_phone),
                Some(place),
                Some(quality),
                Some(category),
            ) => Ok(NewListing {
                name,
                images: self.images.unwrap_or_default(),
                price,
                seller,
                seller_phone,
                place,
                quality: quality.parse()?,
                added_by,
                color: present(&self.color),
                category,
                curved: self.curved.unwrap_or(false),
                multifunctional: self.multifunctional.unwrap_or(false),
            }),
            _ => Err(AppError::Validation(format!(
                "Missing required field(s): {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Edit request. Only these fields may change; `addedBy` is not accepted.
/// `color` distinguishes an absent key from an explicit `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub seller: Option<String>,
    pub seller_phone: Option<String>,
    pub place: Option<String>,
    pub quality: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub color: Option<Option<String>>,
    pub category: Option<String>,
    pub curved: Option<bool>,
    pub multifunctional: Option<bool>,
    pub images: Option<Vec<String>>,
}

/// Present key maps to `Some`, so `null` becomes `Some(None)`.
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Validated edit. `None` leaves a column as it is; `color: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub seller: Option<String>,
    pub seller_phone: Option<String>,
    pub place: Option<String>,
    pub quality: Option<Quality>,
    pub color: Option<Option<String>>,
    pub category: Option<String>,
    pub curved: Option<bool>,
    pub multifunctional: Option<bool>,
    pub images: Option<Vec<String>>,
}

impl UpdateListingRequest {
    /// Validate the edit. Required fields may be changed but not blanked.
    pub fn into_patch(self) -> Result<ListingPatch, AppError> {
        let mut blank = Vec::new();
        let mut required = |field: &'static str, value: Option<String>| {
            value.map(|v| {
                let trimmed = v.trim().to_string();
                if trimmed.is_empty() {
                    blank.push(field);
                }
                trimmed
            })
        };

        let name = required("name", self.name);
        let seller = required("seller", self.seller);
        let seller_phone = required("sellerPhone", self.seller_phone);
        let place = required("place", self.place);
        let category = required("category", self.category);

        if !blank.is_empty() {
            return Err(AppError::Validation(format!(
                "Field(s) cannot be empty: {}",
                blank.join(", ")
            )));
        }

        if matches!(self.price, Some(price) if price <= 0.0) {
            return Err(AppError::Validation("price must be greater than 0".to_string()));
        }

        let quality = self.quality.as_deref().map(str::parse::<Quality>).transpose()?;

        Ok(ListingPatch {
            name,
            price: self.price,
            seller,
            seller_phone,
            place,
            quality,
            // 空字符串与 null 一样清除颜色
            color: self.color.map(|color| present(&color)),
            category,
            curved: self.curved,
            multifunctional: self.multifunctional,
            images: self.images,
        })
    }
}

impl ListingPatch {
    /// Apply onto a stored listing. Identity, owner and date are never touched.
    pub fn apply_to(&self, listing: &mut Listing) {
        if let Some(name) = &self.name {
            listing.name = name.clone();
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
        if let Some(seller) = &self.seller {
            listing.seller = seller.clone();
        }
        if let Some(seller_phone) = &self.seller_phone {
            listing.seller_phone = seller_phone.clone();
        }
        if let Some(place) = &self.place {
            listing.place = place.clone();
        }
        if let Some(quality) = self.quality {
            listing.quality = quality;
        }
        if let Some(color) = &self.color {
            listing.color = color.clone();
        }
        if let Some(category) = &self.category {
            listing.category = category.clone();
        }
        if let Some(curved) = self.curved {
            listing.curved = curved;
        }
        if let Some(multifunctional) = self.multifunctional {
            listing.multifunctional = multifunctional;
        }
        if let Some(images) = &self.images {
            listing.images = images.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> CreateListingRequest {
        CreateListingRequest {
            name: Some("Oak desk".to_string()),
            price: Some(120.0),
            seller: Some("Ravi".to_string()),
            seller_phone: Some("555-0102".to_string()),
            place: Some("Pune".to_string()),
            quality: Some("Good".to_string()),
            color: None,
            category: Some("furniture".to_string()),
            curved: None,
            multifunctional: Some(true),
            images: None,
        }
    }

    #[test]
    fn test_missing_fields_are_listed_together() {
        let req = CreateListingRequest {
            name: Some("Lamp".to_string()),
            price: Some(0.0),
            ..Default::default()
        };
        let err = req.into_new_listing(Uuid::new_v4()).unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(
                msg,
                "Missing required field(s): price, seller, sellerPhone, place, quality, category"
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_defaults_applied() {
        let owner = Uuid::new_v4();
        let listing = full_request().into_new_listing(owner).unwrap();
        assert_eq!(listing.added_by, owner);
        assert_eq!(listing.quality, Quality::Good);
        assert!(listing.images.is_empty());
        assert!(!listing.curved);
        assert!(listing.multifunctional);
    }

    #[test]
    fn test_invalid_quality_rejected() {
        let mut req = full_request();
        req.quality = Some("mint".to_string());
        assert!(matches!(
            req.into_new_listing(Uuid::new_v4()),
            Err(AppError::Validation(_))
        ));
    }

    fn stored_listing(owner: Uuid) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            name: "Oak desk".to_string(),
            images: vec![],
            price: 120.0,
            seller: "Ravi".to_string(),
            seller_phone: "555-0102".to_string(),
            place: "Pune".to_string(),
            quality: Quality::Good,
            added_by: owner,
            added_date: Utc::now(),
            color: Some("brown".to_string()),
            category: "furniture".to_string(),
            curved: false,
            multifunctional: false,
        }
    }

    fn patch(value: serde_json::Value) -> Result<ListingPatch, AppError> {
        serde_json::from_value::<UpdateListingRequest>(value)
            .unwrap()
            .into_patch()
    }

    #[test]
    fn test_update_ignores_owner_and_validates_price() {
        let owner = Uuid::new_v4();
        let mut listing = stored_listing(owner);

        patch(serde_json::json!({"price": 99.5, "addedBy": Uuid::new_v4()}))
            .unwrap()
            .apply_to(&mut listing);
        assert_eq!(listing.price, 99.5);
        assert_eq!(listing.added_by, owner);
        assert_eq!(listing.color.as_deref(), Some("brown"));

        assert!(patch(serde_json::json!({"price": -1.0})).is_err());
        assert!(patch(serde_json::json!({"quality": "mint"})).is_err());
    }

    #[test]
    fn test_update_rejects_blank_required_fields() {
        let err = patch(serde_json::json!({"name": "", "seller": "   ", "place": "Pune"}))
            .unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert_eq!(msg, "Field(s) cannot be empty: name, seller")
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let trimmed = patch(serde_json::json!({"name": "  Walnut desk "})).unwrap();
        assert_eq!(trimmed.name.as_deref(), Some("Walnut desk"));
    }

    #[test]
    fn test_update_color_absent_null_and_empty() {
        let mut listing = stored_listing(Uuid::new_v4());

        let untouched = patch(serde_json::json!({"curved": true})).unwrap();
        assert_eq!(untouched.color, None);
        untouched.apply_to(&mut listing);
        assert_eq!(listing.color.as_deref(), Some("brown"));

        let recolor = patch(serde_json::json!({"color": "white"})).unwrap();
        recolor.apply_to(&mut listing);
        assert_eq!(listing.color.as_deref(), Some("white"));

        let cleared = patch(serde_json::json!({"color": null})).unwrap();
        assert_eq!(cleared.color, Some(None));
        cleared.apply_to(&mut listing);
        assert_eq!(listing.color, None);

        listing.color = Some("red".to_string());
        patch(serde_json::json!({"color": ""})).unwrap().apply_to(&mut listing);
        assert_eq!(listing.color, None);
    }
}
