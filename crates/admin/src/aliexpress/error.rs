//! Error types for the AliExpress gateway client.

use thiserror::Error;

/// Errors that can occur when calling the AliExpress Open Platform.
#[derive(Debug, Error)]
pub enum AliExpressError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error response.
    #[error("API error ({code}): {message}")]
    Api {
        /// Error code from the gateway or the business result.
        code: String,
        /// Error message.
        message: String,
    },

    /// Gateway responded with a non-success HTTP status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),
}
