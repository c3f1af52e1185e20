//! Wire types for AliExpress affiliate API responses.
//!
//! The gateway wraps every result twice:
//!
//! ```json
//! { "aliexpress_affiliate_product_query_response": {
//!     "resp_result": { "resp_code": 200, "resp_msg": "...", "result": { ... } } } }
//! ```
//!
//! and reports transport-level failures as `{ "error_response": { "code", "msg" } }`.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use okazje_core::CurrencyCode;

use super::error::AliExpressError;
use crate::models::CandidateProduct;

/// Business result code for "no data" responses.
pub const EMPTY_RESULT_CODE: &str = "405";

/// `resp_result` envelope.
#[derive(Debug, Deserialize)]
pub struct RespResult<T> {
    #[serde(default, deserialize_with = "string_or_number")]
    pub resp_code: Option<String>,
    pub resp_msg: Option<String>,
    pub result: Option<T>,
}

/// `error_response` envelope.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default, deserialize_with = "string_or_number")]
    code: Option<String>,
    msg: Option<String>,
    sub_msg: Option<String>,
}

/// Result of `aliexpress.affiliate.product.query`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQueryResult {
    pub current_page_no: Option<u32>,
    pub current_record_count: Option<u32>,
    pub total_record_count: Option<u64>,
    #[serde(default)]
    pub products: ProductList,
}

/// Result of `aliexpress.affiliate.productdetail.get`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductDetailResult {
    pub current_record_count: Option<u32>,
    #[serde(default)]
    pub products: ProductList,
}

/// `products.product` array.
#[derive(Debug, Default, Deserialize)]
pub struct ProductList {
    #[serde(default)]
    pub product: Vec<AliProduct>,
}

/// A product as returned by the affiliate API.
#[derive(Debug, Clone, Deserialize)]
pub struct AliProduct {
    #[serde(deserialize_with = "string_or_number")]
    pub product_id: Option<String>,
    pub product_title: Option<String>,
    pub product_main_image_url: Option<String>,
    pub product_detail_url: Option<String>,
    pub promotion_link: Option<String>,
    pub target_sale_price: Option<String>,
    pub target_original_price: Option<String>,
    pub target_sale_price_currency: Option<String>,
    /// Positive feedback rate, e.g. `"95.3%"`.
    pub evaluate_rate: Option<String>,
    pub lastest_volume: Option<i64>,
    pub first_level_category_name: Option<String>,
    pub second_level_category_name: Option<String>,
}

impl AliProduct {
    /// Convert into a candidate for import. Returns `None` without an ID or title.
    #[must_use]
    pub fn into_candidate(self, fallback_currency: CurrencyCode) -> Option<CandidateProduct> {
        let external_id = self.product_id.filter(|id| !id.is_empty())?;
        let title = self
            .product_title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())?;

        let currency = self
            .target_sale_price_currency
            .as_deref()
            .and_then(|c| c.parse::<CurrencyCode>().ok())
            .unwrap_or(fallback_currency);

        Some(CandidateProduct {
            external_id,
            title,
            category: self
                .second_level_category_name
                .or(self.first_level_category_name),
            image_url: self.product_main_image_url,
            product_url: self.promotion_link.or(self.product_detail_url),
            price: self.target_sale_price.as_deref().and_then(parse_price),
            original_price: self.target_original_price.as_deref().and_then(parse_price),
            currency,
            rating: self.evaluate_rate.as_deref().and_then(parse_rating),
            orders_count: self
                .lastest_volume
                .and_then(|v| i32::try_from(v).ok())
                .unwrap_or(0),
        })
    }
}

/// Parse a decimal price string such as `"129.99"`.
fn parse_price(raw: &str) -> Option<Decimal> {
    raw.trim().parse::<Decimal>().ok().filter(|p| *p > Decimal::ZERO)
}

/// Convert a positive feedback percentage into a 0-5 star rating.
fn parse_rating(raw: &str) -> Option<f64> {
    let percent: f64 = raw.trim().trim_end_matches('%').trim().parse().ok()?;
    (0.0..=100.0).contains(&percent).then(|| percent / 20.0)
}

/// Accept a JSON string or number and keep it as a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Unwrap the gateway envelopes for `method` and deserialize the business result.
///
/// Returns `Ok(None)` when the gateway reports an empty result.
///
/// # Errors
///
/// Returns `AliExpressError::Api` for `error_response` bodies and non-200
/// business codes, and `AliExpressError::Parse` for malformed bodies.
pub fn parse_response<T: DeserializeOwned>(
    method: &str,
    body: &str,
) -> Result<Option<T>, AliExpressError> {
    let mut value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AliExpressError::Parse(format!("invalid JSON: {e}")))?;

    if let Some(error) = value.get_mut("error_response").map(serde_json::Value::take) {
        let error: ErrorResponse = serde_json::from_value(error)
            .map_err(|e| AliExpressError::Parse(format!("invalid error_response: {e}")))?;
        return Err(AliExpressError::Api {
            code: error.code.unwrap_or_else(|| "unknown".to_string()),
            message: error.sub_msg.or(error.msg).unwrap_or_default(),
        });
    }

    let key = format!("{}_response", method.replace('.', "_"));
    let resp_result = value
        .get_mut(&key)
        .and_then(|v| v.get_mut("resp_result"))
        .map(serde_json::Value::take)
        .ok_or_else(|| AliExpressError::Parse(format!("missing {key}.resp_result")))?;

    let resp: RespResult<T> = serde_json::from_value(resp_result)
        .map_err(|e| AliExpressError::Parse(format!("invalid resp_result: {e}")))?;

    match resp.resp_code.as_deref() {
        None | Some("200") => Ok(resp.result),
        Some(EMPTY_RESULT_CODE) => Ok(None),
        Some(code) => Err(AliExpressError::Api {
            code: code.to_string(),
            message: resp.resp_msg.unwrap_or_default(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METHOD: &str = "aliexpress.affiliate.product.query";

    #[test]
    fn test_parse_product_query_response() {
        let body = r#"{
            "aliexpress_affiliate_product_query_response": {
                "resp_result": {
                    "resp_code": 200,
                    "resp_msg": "Call succeeds",
                    "result": {
                        "current_page_no": 1,
                        "current_record_count": 1,
                        "total_record_count": 120,
                        "products": { "product": [{
                            "product_id": 1005006123456789,
                            "product_title": "  Smartwatch AMOLED  ",
                            "product_main_image_url": "https://ae01.alicdn.com/kf/a.jpg",
                            "product_detail_url": "https://www.aliexpress.com/item/1005006123456789.html",
                            "promotion_link": "https://s.click.aliexpress.com/e/_abc",
                            "target_sale_price": "89.99",
                            "target_original_price": "179.98",
                            "target_sale_price_currency": "PLN",
                            "evaluate_rate": "96.0%",
                            "lastest_volume": 1543,
                            "first_level_category_name": "Consumer Electronics",
                            "second_level_category_name": "Smart Watches"
                        }]}
                    }
                }
            }
        }"#;

        let result: ProductQueryResult = parse_response(METHOD, body)
            .expect("parse")
            .expect("result present");
        assert_eq!(result.total_record_count, Some(120));

        let product = result
            .products
            .product
            .into_iter()
            .next()
            .expect("one product")
            .into_candidate(CurrencyCode::PLN)
            .expect("candidate");

        assert_eq!(product.external_id, "1005006123456789");
        assert_eq!(product.title, "Smartwatch AMOLED");
        assert_eq!(product.price, Some(Decimal::new(8999, 2)));
        assert_eq!(product.original_price, Some(Decimal::new(17998, 2)));
        assert_eq!(product.category.as_deref(), Some("Smart Watches"));
        assert_eq!(
            product.product_url.as_deref(),
            Some("https://s.click.aliexpress.com/e/_abc")
        );
        assert_eq!(product.orders_count, 1543);
        assert!((product.rating.expect("rating") - 4.8).abs() < 1e-9);
    }

    #[test]
    fn test_parse_error_response() {
        let body = r#"{"error_response":{"code":"IncompleteSignature","msg":"Bad sign","request_id":"x"}}"#;
        let result = parse_response::<ProductQueryResult>(METHOD, body);
        assert!(matches!(
            result,
            Err(AliExpressError::Api { ref code, .. }) if code == "IncompleteSignature"
        ));
    }

    #[test]
    fn test_parse_business_error_code() {
        let body = r#"{"aliexpress_affiliate_product_query_response":{"resp_result":{"resp_code":402,"resp_msg":"Invalid input"}}}"#;
        let result = parse_response::<ProductQueryResult>(METHOD, body);
        assert!(matches!(result, Err(AliExpressError::Api { ref code, .. }) if code == "402"));
    }

    #[test]
    fn test_parse_empty_result() {
        let body = r#"{"aliexpress_affiliate_product_query_response":{"resp_result":{"resp_code":405,"resp_msg":"The result is empty"}}}"#;
        let result = parse_response::<ProductQueryResult>(METHOD, body).expect("parse");
        assert!(result.is_none());
    }

    #[test]
    fn test_parse_missing_envelope() {
        let result = parse_response::<ProductQueryResult>(METHOD, r#"{"other":{}}"#);
        assert!(matches!(result, Err(AliExpressError::Parse(_))));
    }

    #[test]
    fn test_candidate_requires_id_and_title() {
        let product = AliProduct {
            product_id: None,
            product_title: Some("Title".to_string()),
            product_main_image_url: None,
            product_detail_url: None,
            promotion_link: None,
            target_sale_price: None,
            target_original_price: None,
            target_sale_price_currency: None,
            evaluate_rate: None,
            lastest_volume: None,
            first_level_category_name: None,
            second_level_category_name: None,
        };
        assert!(product.into_candidate(CurrencyCode::PLN).is_none());
    }

    #[test]
    fn test_parse_rating_bounds() {
        assert_eq!(parse_rating("100%"), Some(5.0));
        assert_eq!(parse_rating("abc"), None);
        assert_eq!(parse_rating("150%"), None);
    }
}
