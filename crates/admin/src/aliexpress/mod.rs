//! AliExpress Open Platform integration.
//!
//! - [`signing`]: AOP request signatures and form encoding
//! - [`client`]: affiliate product search and detail lookup
//! - [`types`]: gateway response envelopes

pub mod client;
pub mod error;
pub mod signing;
pub mod types;

pub use client::{AliExpressClient, MAX_PAGE_SIZE, ProductPage, ProductQuery};
pub use error::AliExpressError;
pub use signing::{
    AppCredentials, ParamValue, Params, SignedParams, build_request_params, sign, to_query_string,
};
