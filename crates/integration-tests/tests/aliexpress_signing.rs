//! Integration tests for AliExpress request signing.
//!
//! Expected signatures are fixed MD5 vectors, so a change to the canonical
//! string (ordering, filtering, secret wrapping) breaks these tests.

use chrono::{TimeZone, Utc};
use okazje_admin::aliexpress::{
    AppCredentials, ParamValue, Params, build_request_params, sign, to_query_string,
};

const SECRET: &str = "test-secret-123";

fn fixed_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 8, 5, 9)
        .single()
        .expect("valid time")
}

// =============================================================================
// sign
// =============================================================================

#[test]
fn test_sign_matches_known_vector() {
    let signature = sign(
        [("b", Some(ParamValue::from("2"))), ("a", Some(ParamValue::from("1")))],
        "s",
    );
    // MD5("sa1b2s")
    assert_eq!(signature, "5EE29085AF57D942F21F1C5BA3C2A90A");
}

#[test]
fn test_sign_skips_absent_values() {
    let with_absent = sign(
        [
            ("a", Some(ParamValue::from("1"))),
            ("b", Some(ParamValue::from("2"))),
            ("category_ids", None),
            ("sort", Some(ParamValue::from(""))),
        ],
        "s",
    );
    assert_eq!(with_absent, "5EE29085AF57D942F21F1C5BA3C2A90A");
}

// =============================================================================
// build_request_params
// =============================================================================

#[test]
fn test_full_request_signature() {
    let mut business = Params::new();
    business.insert("keywords".to_string(), Some("smartwatch".into()));
    business.insert("page_no".to_string(), Some(ParamValue::from(1_u32)));
    business.insert("target_currency".to_string(), Some("PLN".into()));
    business.insert("tracking_id".to_string(), None);

    let credentials = AppCredentials {
        app_key: "12345",
        app_secret: SECRET,
    };
    let signed = build_request_params(
        "aliexpress.affiliate.product.query",
        business,
        &credentials,
        fixed_time(),
    );

    assert_eq!(
        signed.get("sign").map(String::as_str),
        Some("A548869FFF7AA0543E5AC54224470A06")
    );
    assert!(!signed.contains_key("tracking_id"));
    assert_eq!(signed.len(), 10);
}

#[test]
fn test_protocol_fields_override_business_params() {
    let mut business = Params::new();
    business.insert("method".to_string(), Some("spoofed".into()));
    business.insert("format".to_string(), Some("xml".into()));

    let credentials = AppCredentials {
        app_key: "12345",
        app_secret: SECRET,
    };
    let signed = build_request_params(
        "aliexpress.affiliate.productdetail.get",
        business,
        &credentials,
        fixed_time(),
    );

    assert_eq!(
        signed.get("method").map(String::as_str),
        Some("aliexpress.affiliate.productdetail.get")
    );
    assert_eq!(signed.get("format").map(String::as_str), Some("json"));
}

#[test]
fn test_query_string_carries_signature() {
    let credentials = AppCredentials {
        app_key: "12345",
        app_secret: SECRET,
    };
    let signed = build_request_params(
        "aliexpress.affiliate.product.query",
        Params::new(),
        &credentials,
        fixed_time(),
    );
    let body = to_query_string(&signed);

    assert!(body.contains("timestamp=2026-03-01+08%3A05%3A09"));
    assert!(body.contains(&format!("sign={}", signed["sign"])));
}
