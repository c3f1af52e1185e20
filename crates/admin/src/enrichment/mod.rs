//! AI enrichment of imported products.
//!
//! Each step is one model call that must answer with a single JSON object.
//! The [`Enricher`] trait is the seam used by the import pipeline so runs
//! can be exercised without network access.

pub mod claude;
pub mod prompts;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::claude::ClaudeError;
use crate::models::CandidateProduct;

pub use claude::ClaudeEnricher;

/// Storefront categories offered to the category mapper.
pub const CATEGORIES: &[&str] = &[
    "Elektronika",
    "Telefony i akcesoria",
    "Komputery",
    "Dom i ogród",
    "Moda",
    "Zdrowie i uroda",
    "Sport i turystyka",
    "Motoryzacja",
    "Dziecko",
    "Zabawki i gry",
    "Narzędzia",
    "Zwierzęta",
    "Inne",
];

/// Confidence below which a category mapping is not trusted.
pub const MIN_CATEGORY_CONFIDENCE: f64 = 0.5;

/// Errors from an enrichment step.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// The model call failed.
    #[error("model error: {0}")]
    Model(#[from] ClaudeError),

    /// The reply contained no JSON object.
    #[error("no JSON object in model reply")]
    MissingJson,

    /// The JSON did not match the expected shape.
    #[error("invalid model reply: {0}")]
    InvalidReply(String),
}

/// Quality assessment of a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityScore {
    /// 0-100, higher is better.
    pub score: i32,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// Storefront category chosen for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMapping {
    pub category: String,
    /// 0.0-1.0.
    pub confidence: f64,
}

/// SEO metadata for a product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoContent {
    pub title: String,
    pub description: String,
}

/// AI enrichment operations applied to each imported product.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Score listing quality from 0 to 100.
    async fn score_quality(&self, product: &CandidateProduct)
        -> Result<QualityScore, EnrichmentError>;

    /// Rewrite the marketplace title into a short, clean Polish title.
    async fn normalize_title(&self, product: &CandidateProduct) -> Result<String, EnrichmentError>;

    /// Pick the best matching entry of `categories`.
    async fn map_category(
        &self,
        product: &CandidateProduct,
        categories: &[&str],
    ) -> Result<CategoryMapping, EnrichmentError>;

    /// Generate SEO title and description.
    async fn generate_seo(
        &self,
        product: &CandidateProduct,
        title: &str,
    ) -> Result<SeoContent, EnrichmentError>;
}

/// Extract and deserialize the first JSON object in a model reply.
///
/// Accepts bare JSON, JSON wrapped in ```` ``` ```` or ```` ```json ````
/// fences, and JSON surrounded by prose.
///
/// # Errors
///
/// Returns `MissingJson` when no object is found and `InvalidReply` when it
/// does not deserialize into `T`.
pub fn extract_json<T: DeserializeOwned>(reply: &str) -> Result<T, EnrichmentError> {
    let text = strip_fences(reply.trim());
    let start = text.find('{').ok_or(EnrichmentError::MissingJson)?;
    let end = text.rfind('}').ok_or(EnrichmentError::MissingJson)?;
    if end < start {
        return Err(EnrichmentError::MissingJson);
    }

    serde_json::from_str(&text[start..=end])
        .map_err(|e| EnrichmentError::InvalidReply(e.to_string()))
}

fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Skip an optional language tag on the opening fence line.
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

impl QualityScore {
    /// Clamp the score into 0..=100.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            score: self.score.clamp(0, 100),
            reasons: self.reasons,
        }
    }
}

impl CategoryMapping {
    /// Resolve the category to store, falling back when the mapping is
    /// unsure or names a category outside `categories`.
    #[must_use]
    pub fn resolve<'a>(&'a self, categories: &[&str], fallback: &'a str) -> &'a str {
        let known = categories.iter().any(|c| *c == self.category);
        if known && self.confidence >= MIN_CATEGORY_CONFIDENCE {
            &self.category
        } else {
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_bare() {
        let score: QualityScore = extract_json(r#"{"score": 72, "reasons": ["ok"]}"#).expect("json");
        assert_eq!(score.score, 72);
        assert_eq!(score.reasons, vec!["ok".to_string()]);
    }

    #[test]
    fn test_extract_json_fenced() {
        let reply = "```json\n{\"title\": \"Zegarek\", \"description\": \"Opis\"}\n```";
        let seo: SeoContent = extract_json(reply).expect("json");
        assert_eq!(seo.title, "Zegarek");
    }

    #[test]
    fn test_extract_json_plain_fence_and_prose() {
        let reply = "```\n{\"category\": \"Moda\", \"confidence\": 0.9}\n```";
        let mapping: CategoryMapping = extract_json(reply).expect("json");
        assert_eq!(mapping.category, "Moda");

        let reply = "Oto wynik: {\"score\": 10} dziękuję";
        let score: QualityScore = extract_json(reply).expect("json");
        assert_eq!(score.score, 10);
        assert!(score.reasons.is_empty());
    }

    #[test]
    fn test_extract_json_errors() {
        assert!(matches!(
            extract_json::<QualityScore>("no json here"),
            Err(EnrichmentError::MissingJson)
        ));
        assert!(matches!(
            extract_json::<QualityScore>(r#"{"grade": "A"}"#),
            Err(EnrichmentError::InvalidReply(_))
        ));
    }

    #[test]
    fn test_quality_score_clamped() {
        let score = QualityScore {
            score: 140,
            reasons: Vec::new(),
        };
        assert_eq!(score.clamped().score, 100);
    }

    #[test]
    fn test_category_resolve() {
        let confident = CategoryMapping {
            category: "Moda".to_string(),
            confidence: 0.8,
        };
        assert_eq!(confident.resolve(CATEGORIES, "Elektronika"), "Moda");

        let unsure = CategoryMapping {
            category: "Moda".to_string(),
            confidence: 0.49,
        };
        assert_eq!(unsure.resolve(CATEGORIES, "Elektronika"), "Elektronika");

        let unknown = CategoryMapping {
            category: "Kosmos".to_string(),
            confidence: 0.99,
        };
        assert_eq!(unknown.resolve(CATEGORIES, "Elektronika"), "Elektronika");
    }
}
