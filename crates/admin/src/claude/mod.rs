//! Anthropic Messages API client used for product enrichment.
//!
//! Only single-turn, non-streaming text completions are needed: each
//! enrichment step sends one prompt and reads back one JSON document.

pub mod client;
pub mod error;
pub mod types;

pub use client::ClaudeClient;
pub use error::ClaudeError;
pub use types::{ChatRequest, ChatResponse, ContentBlock, Message, Role, StopReason, Usage};
