//! Pre-filter applied before any AI call.

use rust_decimal::Decimal;

use crate::models::{CandidateProduct, ImportProfile};

/// Why a product was dropped by the pre-filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterReason {
    MissingPrice,
    MissingUrl,
    LowRating { rating: f64, min: f64 },
    LowDiscount { discount: Decimal, min: i32 },
}

impl std::fmt::Display for FilterReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPrice => f.write_str("missing price"),
            Self::MissingUrl => f.write_str("missing product URL"),
            Self::LowRating { rating, min } => write!(f, "rating {rating:.1} below {min:.1}"),
            Self::LowDiscount { discount, min } => write!(f, "discount {discount}% below {min}%"),
        }
    }
}

/// Price and link of a product that passed the pre-filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligible {
    pub price: Decimal,
    pub product_url: String,
}

/// Check a candidate against the profile thresholds.
///
/// A missing rating or discount counts as zero.
///
/// # Errors
///
/// Returns the first failed criterion.
pub fn check(product: &CandidateProduct, profile: &ImportProfile) -> Result<Eligible, FilterReason> {
    let price = product.price.ok_or(FilterReason::MissingPrice)?;
    let product_url = product
        .product_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(FilterReason::MissingUrl)?;

    let rating = product.rating.unwrap_or(0.0);
    if rating < profile.min_rating {
        return Err(FilterReason::LowRating {
            rating,
            min: profile.min_rating,
        });
    }

    let discount = product.discount_percent().unwrap_or(Decimal::ZERO);
    if discount < Decimal::from(profile.min_discount_percent) {
        return Err(FilterReason::LowDiscount {
            discount,
            min: profile.min_discount_percent,
        });
    }

    Ok(Eligible {
        price,
        product_url: product_url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use okazje_core::{CurrencyCode, ImportProfileId};

    fn profile(min_rating: f64, min_discount_percent: i32) -> ImportProfile {
        ImportProfile {
            id: ImportProfileId::new(1),
            name: "Zegarki".to_string(),
            keywords: "smartwatch".to_string(),
            category_id: None,
            target_category: "Elektronika".to_string(),
            min_rating,
            min_discount_percent,
            max_items: 10,
            quality_threshold: 60,
            auto_approve: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn product() -> CandidateProduct {
        CandidateProduct {
            external_id: "1".to_string(),
            title: "Smartwatch".to_string(),
            category: None,
            image_url: None,
            product_url: Some(" https://s.click.aliexpress.com/e/_x ".to_string()),
            price: Some(Decimal::new(6000, 2)),
            original_price: Some(Decimal::new(10000, 2)),
            currency: CurrencyCode::PLN,
            rating: Some(4.6),
            orders_count: 300,
        }
    }

    #[test]
    fn test_passes_thresholds() {
        let eligible = check(&product(), &profile(4.5, 40)).expect("eligible");
        assert_eq!(eligible.price, Decimal::new(6000, 2));
        assert_eq!(eligible.product_url, "https://s.click.aliexpress.com/e/_x");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(check(&product(), &profile(4.6, 40)).is_ok());
    }

    #[test]
    fn test_rejects_low_rating() {
        let result = check(&product(), &profile(4.7, 0));
        assert!(matches!(result, Err(FilterReason::LowRating { .. })));
    }

    #[test]
    fn test_rejects_low_discount() {
        let result = check(&product(), &profile(0.0, 41));
        assert!(matches!(result, Err(FilterReason::LowDiscount { .. })));
    }

    #[test]
    fn test_missing_rating_counts_as_zero() {
        let mut p = product();
        p.rating = None;
        assert!(check(&p, &profile(0.0, 0)).is_ok());
        assert!(check(&p, &profile(1.0, 0)).is_err());
    }

    #[test]
    fn test_rejects_missing_price_or_url() {
        let mut p = product();
        p.price = None;
        assert_eq!(check(&p, &profile(0.0, 0)), Err(FilterReason::MissingPrice));

        let mut p = product();
        p.product_url = Some("  ".to_string());
        assert_eq!(check(&p, &profile(0.0, 0)), Err(FilterReason::MissingUrl));
    }
}
