//! Business logic services layer

pub mod auth_service;
pub mod listing_service;

pub use auth_service::{AuthService, ProfileImage};
pub use listing_service::ListingService;
