//! Import profile domain models.
//!
//! A profile describes one recurring AliExpress search: what to query,
//! which thresholds a product must pass, and where it lands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use okazje_core::{ImportProfileId, ImportRunId};

/// Upper bound on products fetched per run.
pub const MAX_ITEMS_LIMIT: i32 = 500;

/// A stored import profile.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ImportProfile {
    pub id: ImportProfileId,
    /// Unique human-readable name.
    pub name: String,
    /// Search keywords sent to the marketplace.
    pub keywords: String,
    /// Marketplace category filter.
    pub category_id: Option<String>,
    /// Storefront category used when AI category mapping is unsure.
    pub target_category: String,
    /// Minimum rating on a 0-5 scale.
    pub min_rating: f64,
    /// Minimum discount in whole percent.
    pub min_discount_percent: i32,
    /// Maximum number of products fetched per run.
    pub max_items: i32,
    /// Minimum AI quality score (0-100).
    pub quality_threshold: i32,
    /// Publish imported deals immediately instead of queueing them.
    pub auto_approve: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an import profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImportProfileInput {
    pub name: String,
    pub keywords: String,
    #[serde(default)]
    pub category_id: Option<String>,
    pub target_category: String,
    #[serde(default)]
    pub min_rating: f64,
    #[serde(default)]
    pub min_discount_percent: i32,
    #[serde(default = "default_max_items")]
    pub max_items: i32,
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: i32,
    #[serde(default)]
    pub auto_approve: bool,
}

const fn default_max_items() -> i32 {
    50
}

const fn default_quality_threshold() -> i32 {
    60
}

impl CreateImportProfileInput {
    /// Trim text fields and check numeric bounds.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message describing the first invalid field.
    pub fn normalize(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_string();
        self.keywords = self.keywords.trim().to_string();
        self.target_category = self.target_category.trim().to_string();
        self.category_id = self
            .category_id
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        if self.name.is_empty() {
            return Err("name is required".to_string());
        }
        if self.keywords.is_empty() {
            return Err("keywords are required".to_string());
        }
        if self.target_category.is_empty() {
            return Err("targetCategory is required".to_string());
        }
        if !(0.0..=5.0).contains(&self.min_rating) {
            return Err("minRating must be between 0 and 5".to_string());
        }
        if !(0..=100).contains(&self.min_discount_percent) {
            return Err("minDiscountPercent must be between 0 and 100".to_string());
        }
        if !(1..=MAX_ITEMS_LIMIT).contains(&self.max_items) {
            return Err(format!("maxItems must be between 1 and {MAX_ITEMS_LIMIT}"));
        }
        if !(0..=100).contains(&self.quality_threshold) {
            return Err("qualityThreshold must be between 0 and 100".to_string());
        }
        Ok(self)
    }
}

/// A finished import run.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ImportRun {
    pub id: ImportRunId,
    pub profile_id: ImportProfileId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub fetched: i32,
    pub filtered_out: i32,
    pub below_quality: i32,
    pub imported: i32,
    pub duplicates: i32,
    pub failed: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(json: &str) -> CreateImportProfileInput {
        serde_json::from_str(json).expect("deserialize")
    }

    #[test]
    fn test_defaults_applied() {
        let profile = input(r#"{"name":"Zegarki","keywords":"smartwatch","targetCategory":"Elektronika"}"#)
            .normalize()
            .expect("valid");
        assert_eq!(profile.max_items, 50);
        assert_eq!(profile.quality_threshold, 60);
        assert!(!profile.auto_approve);
        assert!(profile.category_id.is_none());
    }

    #[test]
    fn test_normalize_trims_and_drops_blank_category() {
        let profile = input(
            r#"{"name":"  Zegarki ","keywords":" smartwatch ","targetCategory":" Elektronika ","categoryId":"  "}"#,
        )
        .normalize()
        .expect("valid");
        assert_eq!(profile.name, "Zegarki");
        assert_eq!(profile.keywords, "smartwatch");
        assert_eq!(profile.target_category, "Elektronika");
        assert!(profile.category_id.is_none());
    }

    #[test]
    fn test_normalize_rejects_out_of_range() {
        let base = r#""name":"a","keywords":"b","targetCategory":"c""#;
        assert!(input(&format!("{{{base},\"minRating\":5.5}}")).normalize().is_err());
        assert!(input(&format!("{{{base},\"maxItems\":0}}")).normalize().is_err());
        assert!(input(&format!("{{{base},\"qualityThreshold\":101}}")).normalize().is_err());
        assert!(input(&format!("{{{base},\"minDiscountPercent\":-1}}")).normalize().is_err());
        assert!(input(r#"{"name":" ","keywords":"b","targetCategory":"c"}"#).normalize().is_err());
    }
}
