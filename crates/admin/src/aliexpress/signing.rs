//! AliExpress Open Platform (AOP) request signing.
//!
//! Every gateway call carries a `sign` parameter computed as:
//!
//! 1. drop parameters whose value is missing or empty,
//! 2. sort the remaining keys lexicographically (byte order),
//! 3. concatenate `key + value` for each pair,
//! 4. wrap the result in the app secret on both sides,
//! 5. MD5 the UTF-8 bytes and render uppercase hex.
//!
//! The signature depends only on the retained key/value set, never on the
//! order parameters were supplied in.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};

/// Timestamp format expected by the gateway (UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Default response format.
pub const DEFAULT_FORMAT: &str = "json";
/// Default protocol version.
pub const DEFAULT_VERSION: &str = "2.0";
/// Default signature method.
pub const DEFAULT_SIGN_METHOD: &str = "md5";

/// A scalar request parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ParamValue {
    /// Whether the value is dropped before signing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Str(s) if s.is_empty())
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) if n.is_nan() => f.write_str("NaN"),
            Self::Float(n) if n.is_infinite() => {
                f.write_str(if n.is_sign_positive() { "Infinity" } else { "-Infinity" })
            }
            // Adding +0.0 turns -0.0 into 0.0 and leaves everything else alone.
            Self::Float(n) => write!(f, "{}", n + 0.0),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Request parameters before signing. `None` models an absent value.
pub type Params = BTreeMap<String, Option<ParamValue>>;

/// Final, signed request parameters.
pub type SignedParams = BTreeMap<String, String>;

/// Keep only parameters with a non-empty value, rendered as strings.
fn retained<K, I>(params: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, Option<ParamValue>)>,
    K: Into<String>,
{
    params
        .into_iter()
        .filter_map(|(key, value)| match value {
            Some(v) if !v.is_empty() => Some((key.into(), v.to_string())),
            _ => None,
        })
        .collect()
}

/// Compute the AOP signature of `params` with `secret`.
///
/// Entries with a `None` or empty-string value do not affect the result.
#[must_use]
pub fn sign<K, I>(params: I, secret: &str) -> String
where
    I: IntoIterator<Item = (K, Option<ParamValue>)>,
    K: Into<String>,
{
    let sorted = retained(params);

    let mut hasher = Md5::new();
    hasher.update(secret.as_bytes());
    for (key, value) in &sorted {
        hasher.update(key.as_bytes());
        hasher.update(value.as_bytes());
    }
    hasher.update(secret.as_bytes());

    hex::encode_upper(hasher.finalize())
}

/// Application credentials for the gateway.
pub struct AppCredentials<'a> {
    pub app_key: &'a str,
    pub app_secret: &'a str,
}

/// Assemble and sign the full parameter set for a gateway call.
///
/// Adds `method`, `app_key`, `timestamp`, `format`, `v` and `sign_method` to
/// the business parameters, then computes `sign` over everything. Protocol
/// fields override business parameters of the same name.
#[must_use]
pub fn build_request_params(
    method: &str,
    business: Params,
    credentials: &AppCredentials<'_>,
    now: DateTime<Utc>,
) -> SignedParams {
    let mut params = business;
    let protocol = [
        ("method", method.to_string()),
        ("app_key", credentials.app_key.to_string()),
        ("timestamp", now.format(TIMESTAMP_FORMAT).to_string()),
        ("format", DEFAULT_FORMAT.to_string()),
        ("v", DEFAULT_VERSION.to_string()),
        ("sign_method", DEFAULT_SIGN_METHOD.to_string()),
    ];
    for (key, value) in protocol {
        params.insert(key.to_string(), Some(ParamValue::Str(value)));
    }

    let mut signed = retained(params);
    let signature = sign(
        signed
            .iter()
            .map(|(k, v)| (k.clone(), Some(ParamValue::Str(v.clone())))),
        credentials.app_secret,
    );
    signed.insert("sign".to_string(), signature);
    signed
}

/// Serialize signed parameters as `application/x-www-form-urlencoded`.
#[must_use]
pub fn to_query_string(params: &SignedParams) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn md5_upper(input: &str) -> String {
        hex::encode_upper(Md5::digest(input.as_bytes()))
    }

    fn params(pairs: &[(&str, Option<&str>)]) -> Vec<(String, Option<ParamValue>)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.map(ParamValue::from)))
            .collect()
    }

    #[test]
    fn test_sign_known_vector() {
        let signature = sign(
            params(&[("q", Some("smartwatch")), ("category", Some("electronics"))]),
            "test-secret-123",
        );
        let expected =
            md5_upper("test-secret-123categoryelectronicsqsmartwatchtest-secret-123");
        assert_eq!(signature, expected);
        assert_eq!(signature.len(), 32);
        assert!(signature.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_sign_ignores_input_order() {
        let a = sign(
            params(&[("b", Some("2")), ("a", Some("1")), ("c", Some("3"))]),
            "s",
        );
        let b = sign(
            params(&[("c", Some("3")), ("a", Some("1")), ("b", Some("2"))]),
            "s",
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_sign_drops_missing_and_empty_values() {
        let with_gaps = sign(params(&[("a", Some("1")), ("b", None), ("c", Some(""))]), "s");
        let plain = sign(params(&[("a", Some("1"))]), "s");
        assert_eq!(with_gaps, plain);
    }

    #[test]
    fn test_sign_depends_on_secret_and_values() {
        let base = sign(params(&[("a", Some("1"))]), "s1");
        assert_ne!(base, sign(params(&[("a", Some("1"))]), "s2"));
        assert_ne!(base, sign(params(&[("a", Some("2"))]), "s1"));
        assert_ne!(base, sign(params(&[("b", Some("1"))]), "s1"));
    }

    #[test]
    fn test_sign_empty_params_is_defined() {
        let signature = sign(Vec::<(String, Option<ParamValue>)>::new(), "secret");
        assert_eq!(signature, md5_upper("secretsecret"));
    }

    #[test]
    fn test_scalar_values_render_as_text() {
        let mut p = Params::new();
        p.insert("page_no".to_string(), Some(ParamValue::from(2_u32)));
        p.insert("ratio".to_string(), Some(ParamValue::from(1.5)));
        p.insert("flag".to_string(), Some(ParamValue::from(true)));

        assert_eq!(sign(p, "k"), md5_upper("kflagtruepage_no2ratio1.5k"));
    }

    #[test]
    fn test_non_finite_floats_render_like_gateway_clients() {
        assert_eq!(ParamValue::Float(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(ParamValue::Float(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(ParamValue::Float(f64::NAN).to_string(), "NaN");
        assert_eq!(ParamValue::Float(-0.0).to_string(), "0");

        let as_float = vec![("min_sale_price".to_string(), Some(ParamValue::from(f64::INFINITY)))];
        let as_text = params(&[("min_sale_price", Some("Infinity"))]);
        assert_eq!(sign(as_float, "secret"), sign(as_text, "secret"));
    }

    #[test]
    fn test_build_request_params_adds_protocol_fields() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 5, 9).single().expect("valid time");
        let mut business = Params::new();
        business.insert("keywords".to_string(), Some("smartwatch".into()));
        business.insert("category_ids".to_string(), None);

        let credentials = AppCredentials {
            app_key: "12345",
            app_secret: "top-secret",
        };
        let signed = build_request_params(
            "aliexpress.affiliate.product.query",
            business,
            &credentials,
            now,
        );

        assert_eq!(signed.get("timestamp").map(String::as_str), Some("2026-03-01 08:05:09"));
        assert_eq!(signed.get("format").map(String::as_str), Some("json"));
        assert_eq!(signed.get("v").map(String::as_str), Some("2.0"));
        assert_eq!(signed.get("sign_method").map(String::as_str), Some("md5"));
        assert_eq!(signed.get("app_key").map(String::as_str), Some("12345"));
        assert!(!signed.contains_key("category_ids"));

        let mut unsigned = signed.clone();
        let signature = unsigned.remove("sign").expect("sign present");
        let recomputed = sign(
            unsigned.into_iter().map(|(k, v)| (k, Some(ParamValue::Str(v)))),
            "top-secret",
        );
        assert_eq!(signature, recomputed);
    }

    #[test]
    fn test_to_query_string_encodes_values() {
        let mut signed = SignedParams::new();
        signed.insert("timestamp".to_string(), "2026-03-01 08:05:09".to_string());
        signed.insert("keywords".to_string(), "zegarek & pasek".to_string());

        assert_eq!(
            to_query_string(&signed),
            "keywords=zegarek+%26+pasek&timestamp=2026-03-01+08%3A05%3A09"
        );
    }
}
