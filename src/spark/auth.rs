use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

use super::SparkError;

type HmacSha256 = Hmac<Sha256>;

/// Builds the signed connection URL for the Spark endpoint. The signature
/// covers host, date and request line, so the URL is only valid around the
/// timestamp it embeds; callers must build a fresh one per connection and
/// never cache the result.
pub fn signed_url(
    endpoint: &str,
    api_key: &str,
    api_secret: &str,
    date: DateTime<Utc>,
) -> Result<String, SparkError> {
    let parsed =
        Url::parse(endpoint).map_err(|e| SparkError::InvalidEndpoint(e.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| SparkError::InvalidEndpoint("endpoint has no host".to_string()))?;
    let path = parsed.path();

    let date = date.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
    let canonical = format!("host: {}\ndate: {}\nGET {} HTTP/1.1", host, date, path);

    let signature = sign(&canonical, api_secret)?;
    let authorization_origin = format!(
        "api_key=\"{}\", algorithm=\"hmac-sha256\", headers=\"host date request-line\", signature=\"{}\"",
        api_key, signature
    );
    let authorization = BASE64.encode(authorization_origin.as_bytes());

    Ok(format!(
        "{}?authorization={}&date={}&host={}",
        endpoint,
        urlencoding::encode(&authorization),
        urlencoding::encode(&date),
        urlencoding::encode(host),
    ))
}

fn sign(canonical: &str, secret: &str) -> Result<String, SparkError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SparkError::Protocol(format!("Failed to initialize HMAC: {}", e)))?;
    mac.update(canonical.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
