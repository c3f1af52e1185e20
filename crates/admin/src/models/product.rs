//! Marketplace products as seen before they are persisted.

use rust_decimal::Decimal;
use serde::Serialize;

use okazje_core::{CurrencyCode, discount_percent};

/// A product fetched from a marketplace, before filtering and enrichment.
///
/// Price and URL are optional here because the feed does not guarantee
/// them; the pre-filter drops products missing either.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProduct {
    /// Marketplace product ID.
    pub external_id: String,
    /// Raw marketplace title.
    pub title: String,
    /// Marketplace category name, if any.
    pub category: Option<String>,
    pub image_url: Option<String>,
    /// Affiliate link when available, otherwise the plain product page.
    pub product_url: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub currency: CurrencyCode,
    /// Rating on a 0-5 scale.
    pub rating: Option<f64>,
    pub orders_count: i32,
}

impl CandidateProduct {
    /// Discount against the original price in whole percent.
    #[must_use]
    pub fn discount_percent(&self) -> Option<Decimal> {
        discount_percent(self.price?, self.original_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(price: Option<i64>, original: Option<i64>) -> CandidateProduct {
        CandidateProduct {
            external_id: "1".to_string(),
            title: "Słuchawki".to_string(),
            category: None,
            image_url: None,
            product_url: Some("https://example.test/p/1".to_string()),
            price: price.map(|p| Decimal::new(p, 2)),
            original_price: original.map(|p| Decimal::new(p, 2)),
            currency: CurrencyCode::PLN,
            rating: Some(4.5),
            orders_count: 10,
        }
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(
            candidate(Some(5000), Some(10000)).discount_percent(),
            Some(Decimal::from(50))
        );
        assert_eq!(candidate(Some(5000), None).discount_percent(), None);
        assert_eq!(candidate(None, Some(10000)).discount_percent(), None);
    }
}
