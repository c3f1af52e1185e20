//! Domain models for storefront.

pub mod deal;

pub use deal::{Deal, DealSort, VoteOutcome};
