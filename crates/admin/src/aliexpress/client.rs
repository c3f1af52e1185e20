//! AliExpress affiliate API client.
//!
//! Every call is signed with the app secret and POSTed as a form body to
//! the gateway's `/sync` endpoint.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::AliExpressConfig;
use crate::models::CandidateProduct;

use super::error::AliExpressError;
use super::signing::{AppCredentials, ParamValue, Params, build_request_params, to_query_string};
use super::types::{AliProduct, ProductDetailResult, ProductQueryResult, parse_response};

/// Method name for keyword product search.
pub const PRODUCT_QUERY_METHOD: &str = "aliexpress.affiliate.product.query";
/// Method name for product detail lookup.
pub const PRODUCT_DETAIL_METHOD: &str = "aliexpress.affiliate.productdetail.get";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=utf-8";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY_LENGTH: usize = 512;

/// Maximum page size accepted by `product.query`.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Parameters for a product search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub keywords: String,
    /// Comma-separated marketplace category IDs.
    pub category_ids: Option<String>,
    /// 1-based page number.
    pub page_no: u32,
    pub page_size: u32,
    /// Gateway sort key, e.g. `LAST_VOLUME_DESC`.
    pub sort: Option<String>,
}

impl ProductQuery {
    /// Business parameters for this query, without gateway defaults.
    fn to_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("keywords".to_string(), Some(self.keywords.clone().into()));
        params.insert(
            "category_ids".to_string(),
            self.category_ids.clone().map(ParamValue::from),
        );
        params.insert("page_no".to_string(), Some(self.page_no.into()));
        params.insert(
            "page_size".to_string(),
            Some(self.page_size.min(MAX_PAGE_SIZE).into()),
        );
        params.insert("sort".to_string(), self.sort.clone().map(ParamValue::from));
        params
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    pub products: Vec<CandidateProduct>,
    /// Items the gateway returned, including ones without an ID or title.
    pub raw_count: usize,
    /// Total matches reported by the gateway.
    pub total_record_count: Option<u64>,
}

/// AliExpress affiliate API client.
#[derive(Clone)]
pub struct AliExpressClient {
    inner: Arc<AliExpressClientInner>,
}

struct AliExpressClientInner {
    client: reqwest::Client,
    config: AliExpressConfig,
}

impl AliExpressClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AliExpressConfig) -> Result<Self, AliExpressError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(AliExpressClientInner { client, config }),
        })
    }

    /// Search products by keyword.
    ///
    /// An empty result from the gateway is returned as an empty page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the gateway rejects it.
    #[instrument(skip(self), fields(keywords = %query.keywords, page = query.page_no))]
    pub async fn product_query(&self, query: &ProductQuery) -> Result<ProductPage, AliExpressError> {
        let mut params = query.to_params();
        self.add_locale_params(&mut params);

        let Some(result) = self
            .call::<ProductQueryResult>(PRODUCT_QUERY_METHOD, params)
            .await?
        else {
            return Ok(ProductPage::default());
        };

        tracing::debug!(
            records = result.current_record_count,
            total = result.total_record_count,
            "Product query returned"
        );

        let raw_count = result.products.product.len();
        Ok(ProductPage {
            products: self.to_candidates(result.products.product),
            raw_count,
            total_record_count: result.total_record_count,
        })
    }

    /// Look up products by marketplace ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the gateway rejects it.
    #[instrument(skip(self), fields(count = product_ids.len()))]
    pub async fn product_detail(
        &self,
        product_ids: &[String],
    ) -> Result<Vec<CandidateProduct>, AliExpressError> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut params = Params::new();
        params.insert(
            "product_ids".to_string(),
            Some(product_ids.join(",").into()),
        );
        self.add_locale_params(&mut params);

        let products = self
            .call::<ProductDetailResult>(PRODUCT_DETAIL_METHOD, params)
            .await?
            .map(|result| result.products.product)
            .unwrap_or_default();

        Ok(self.to_candidates(products))
    }

    fn add_locale_params(&self, params: &mut Params) {
        let config = &self.inner.config;
        params.insert(
            "target_currency".to_string(),
            Some(config.target_currency.code().into()),
        );
        params.insert(
            "target_language".to_string(),
            Some(config.target_language.clone().into()),
        );
        params.insert(
            "tracking_id".to_string(),
            config.tracking_id.clone().map(ParamValue::from),
        );
    }

    fn to_candidates(&self, products: Vec<AliProduct>) -> Vec<CandidateProduct> {
        let currency = self.inner.config.target_currency;
        products
            .into_iter()
            .filter_map(|p| p.into_candidate(currency))
            .collect()
    }

    /// Sign and send one gateway call.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        business: Params,
    ) -> Result<Option<T>, AliExpressError> {
        let config = &self.inner.config;
        let credentials = AppCredentials {
            app_key: &config.app_key,
            app_secret: config.app_secret.expose_secret(),
        };
        let params = build_request_params(method, business, &credentials, Utc::now());

        let response = self
            .inner
            .client
            .post(&config.api_url)
            .header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
            .body(to_query_string(&params))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AliExpressError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_LENGTH),
            });
        }

        parse_response(method, &body).inspect_err(|e| {
            tracing::warn!(method, error = %e, "AliExpress call failed");
        })
    }
}

/// Truncate to at most `max` bytes on a char boundary.
fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_clamp_page_size_and_drop_empty() {
        let query = ProductQuery {
            keywords: "smartwatch".to_string(),
            category_ids: None,
            page_no: 2,
            page_size: 200,
            sort: Some("LAST_VOLUME_DESC".to_string()),
        };
        let params = query.to_params();

        assert_eq!(params.get("page_size"), Some(&Some(ParamValue::Int(50))));
        assert_eq!(params.get("page_no"), Some(&Some(ParamValue::Int(2))));
        assert_eq!(params.get("category_ids"), Some(&None));
        assert_eq!(
            params.get("sort"),
            Some(&Some(ParamValue::Str("LAST_VOLUME_DESC".to_string())))
        );
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        assert_eq!(truncate("abc", 10), "abc");
        assert_eq!(truncate("zażółć", 3), "za...");
    }
}
