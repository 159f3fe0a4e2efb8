use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use url::Url;

use crate::error::ConfigError;

pub(crate) const VERIFY_PATH: &str = "/verify";

/// Joins base URL and endpoint by plain concatenation, so a base path is
/// kept as-is (`https://host/api` + `/verify` = `https://host/api/verify`).
pub fn verification_url(base_url: &str, verify_endpoint: &str) -> Result<Url, ConfigError> {
    let raw = format!("{}{}", base_url, verify_endpoint);
    let url = Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl {
        url: raw.clone(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::UnsupportedScheme {
            scheme: scheme.to_string(),
        }),
    }
}

pub(crate) fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_base_and_endpoint() {
        let url = verification_url("https://verifier.example.ch/api", "/v1/verify").unwrap();
        assert_eq!(url.as_str(), "https://verifier.example.ch/api/v1/verify");
    }

    #[test]
    fn rejects_relative_url() {
        let err = verification_url("verifier.example.ch", VERIFY_PATH).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidUrl { ref url, .. } if url == "verifier.example.ch/verify"
        ));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = verification_url("ftp://verifier.example.ch", VERIFY_PATH).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme { ref scheme } if scheme == "ftp"));
    }

    #[test]
    fn json_content_type() {
        let headers = json_headers();
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }
}
