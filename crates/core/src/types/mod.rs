//! Core types for Okazje+.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod status;
pub mod vote;

pub use id::*;
pub use price::{CurrencyCode, Price, discount_percent};
pub use status::*;
pub use vote::{DealTally, VoteAction, VoteDirection, VoteTransition};
