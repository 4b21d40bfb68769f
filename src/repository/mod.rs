//! Database repository layer

pub mod account_repo;
pub mod listing_repo;
pub mod memory;

pub use account_repo::*;
pub use listing_repo::*;
pub use memory::{MemoryAccountRepository, MemoryListingRepository};
