//! Okazje+ Core - Shared domain types.
//!
//! This crate provides common types used across all Okazje+ components:
//! - `storefront` - Public deals API (listing, detail, voting)
//! - `admin` - Internal catalog import and moderation service
//! - `cli` - Command-line tools for migrations and headless imports
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. The vote state machine lives here so that both
//! the storefront transaction and the tests drive the same transition table.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, statuses and the vote state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
