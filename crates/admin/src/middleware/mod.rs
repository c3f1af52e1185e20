//! Middleware for the admin service.

pub mod api_token;

pub use api_token::require_api_token;
