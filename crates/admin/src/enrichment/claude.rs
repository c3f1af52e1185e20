//! Claude-backed implementation of [`Enricher`].

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use crate::claude::ClaudeClient;
use crate::models::CandidateProduct;

use super::prompts::{self, SYSTEM_PROMPT};
use super::{
    CategoryMapping, Enricher, EnrichmentError, QualityScore, SeoContent, extract_json,
};

const QUALITY_MAX_TOKENS: u32 = 400;
const TITLE_MAX_TOKENS: u32 = 200;
const CATEGORY_MAX_TOKENS: u32 = 150;
const SEO_MAX_TOKENS: u32 = 400;

/// Enricher that asks Claude for each step.
#[derive(Clone)]
pub struct ClaudeEnricher {
    client: ClaudeClient,
}

#[derive(Deserialize)]
struct TitleReply {
    title: String,
}

impl ClaudeEnricher {
    #[must_use]
    pub const fn new(client: ClaudeClient) -> Self {
        Self { client }
    }

    async fn ask(&self, prompt: &str, max_tokens: u32) -> Result<String, EnrichmentError> {
        Ok(self.client.complete(SYSTEM_PROMPT, prompt, max_tokens).await?)
    }
}

#[async_trait]
impl Enricher for ClaudeEnricher {
    #[instrument(skip(self, product), fields(external_id = %product.external_id))]
    async fn score_quality(
        &self,
        product: &CandidateProduct,
    ) -> Result<QualityScore, EnrichmentError> {
        let reply = self
            .ask(&prompts::quality_prompt(product), QUALITY_MAX_TOKENS)
            .await?;
        Ok(extract_json::<QualityScore>(&reply)?.clamped())
    }

    #[instrument(skip(self, product), fields(external_id = %product.external_id))]
    async fn normalize_title(&self, product: &CandidateProduct) -> Result<String, EnrichmentError> {
        let reply = self
            .ask(&prompts::title_prompt(product), TITLE_MAX_TOKENS)
            .await?;
        let title = extract_json::<TitleReply>(&reply)?.title.trim().to_string();
        if title.is_empty() {
            return Err(EnrichmentError::InvalidReply("empty title".to_string()));
        }
        Ok(title)
    }

    #[instrument(skip(self, product, categories), fields(external_id = %product.external_id))]
    async fn map_category(
        &self,
        product: &CandidateProduct,
        categories: &[&str],
    ) -> Result<CategoryMapping, EnrichmentError> {
        let reply = self
            .ask(
                &prompts::category_prompt(product, categories),
                CATEGORY_MAX_TOKENS,
            )
            .await?;
        extract_json(&reply)
    }

    #[instrument(skip(self, product, title), fields(external_id = %product.external_id))]
    async fn generate_seo(
        &self,
        product: &CandidateProduct,
        title: &str,
    ) -> Result<SeoContent, EnrichmentError> {
        let reply = self
            .ask(&prompts::seo_prompt(product, title), SEO_MAX_TOKENS)
            .await?;
        extract_json(&reply)
    }
}
