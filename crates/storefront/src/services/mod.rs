//! Business logic services for storefront.
//!
//! # Services
//!
//! - `deal_cache` - In-process cache of deal listing pages

pub mod deal_cache;

pub use deal_cache::{DealCache, ListingKey};
