//! AliExpress helpers.

use chrono::Utc;
use secrecy::ExposeSecret;

use okazje_admin::aliexpress::{AppCredentials, ParamValue, Params, build_request_params, to_query_string};
use okazje_admin::config::{AliExpressConfig, ConfigError};

/// Parse a `key=value` argument.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("parameter name is empty".to_string());
    }
    Ok((key.to_string(), value.to_string()))
}

/// Sign `params` for `method` with the configured app credentials and print
/// the result.
pub fn sign(method: &str, params: Vec<(String, String)>) -> Result<(), ConfigError> {
    let config = AliExpressConfig::from_env()?;

    let business: Params = params
        .into_iter()
        .map(|(k, v)| (k, Some(ParamValue::Str(v))))
        .collect();
    let credentials = AppCredentials {
        app_key: &config.app_key,
        app_secret: config.app_secret.expose_secret(),
    };
    let signed = build_request_params(method, business, &credentials, Utc::now());

    #[allow(clippy::print_stdout)]
    {
        for (key, value) in &signed {
            println!("{key} = {value}");
        }
        println!();
        println!("POST {}", config.api_url);
        println!("{}", to_query_string(&signed));
    }
    Ok(())
}
