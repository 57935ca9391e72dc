//! Service configuration loaded from the environment.
//!
//! All settings are read once at startup into an immutable [`Config`] that is
//! passed by reference into the pipeline components. The SerpAPI key is never
//! echoed back through any endpoint.

use crate::error::{Result, ScholarbibError};
use std::path::PathBuf;
use tracing::info;
use url::Url;

/// Default output directory when `OUTPUT_DIR` is not set
const DEFAULT_OUTPUT_DIR: &str = "./data";

/// Default listen port when `PORT` is not set
const DEFAULT_PORT: u16 = 5000;

/// Default bind address when `HOST` is not set
const DEFAULT_HOST: &str = "0.0.0.0";

/// Immutable process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SerpAPI credential (secret, never echoed)
    pub serpapi_key: String,
    /// Google Scholar profile URL as given in the environment
    pub scholar_url: String,
    /// Author identifier extracted from the profile URL's `user` parameter
    pub user_id: String,
    /// Directory the citations file is written to
    pub output_dir: PathBuf,
    /// Bind address for the HTTP server
    pub host: String,
    /// Listen port for the HTTP server
    pub port: u16,
}

impl Config {
    /// Build configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns a config error if `SERPAPI_KEY` or `SCHOLAR_PROFILE_URL` is
    /// missing, or if the profile URL carries no `user` parameter. The process
    /// must refuse to start in that case.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let serpapi_key = get("SERPAPI_KEY")
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ScholarbibError::Config("SERPAPI_KEY is required".to_string()))?;

        let scholar_url = get("SCHOLAR_PROFILE_URL")
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ScholarbibError::Config("SCHOLAR_PROFILE_URL is required".to_string()))?;

        let user_id = extract_user_id(&scholar_url)?;
        info!(user_id = %user_id, "Extracted author identifier from profile URL");

        let output_dir = PathBuf::from(
            get("OUTPUT_DIR").unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
        );

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ScholarbibError::Config(format!("Invalid PORT '{}': {}", raw, e)))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            serpapi_key,
            scholar_url,
            user_id,
            output_dir,
            host,
            port,
        })
    }
}

/// Extract the author identifier from a Google Scholar profile URL.
///
/// The identifier is the mandatory `user` query parameter, e.g.
/// `https://scholar.google.com/citations?user=ABC123` yields `ABC123`.
pub fn extract_user_id(profile_url: &str) -> Result<String> {
    let parsed = Url::parse(profile_url).map_err(|e| {
        ScholarbibError::Config(format!("Invalid Google Scholar URL '{}': {}", profile_url, e))
    })?;

    parsed
        .query_pairs()
        .find(|(key, value)| key == "user" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| {
            ScholarbibError::Config(format!("No user ID found in URL '{}'", profile_url))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_extract_user_id() {
        let id = extract_user_id("https://scholar.google.com/citations?user=AbC123&hl=en")
            .expect("Failed to extract user id");
        assert_eq!(id, "AbC123");
    }

    #[test]
    fn test_extract_user_id_missing() {
        assert!(extract_user_id("https://scholar.google.com/citations?hl=en").is_err());
        assert!(extract_user_id("not a url").is_err());
    }

    #[test]
    fn test_from_lookup_defaults() {
        let vars = [
            ("SERPAPI_KEY", "secret"),
            ("SCHOLAR_PROFILE_URL", "https://scholar.google.com/citations?user=XyZ"),
        ];
        let config = Config::from_lookup(lookup(&vars)).expect("Failed to build config");
        assert_eq!(config.user_id, "XyZ");
        assert_eq!(config.output_dir, PathBuf::from("./data"));
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_from_lookup_missing_key() {
        let vars = [(
            "SCHOLAR_PROFILE_URL",
            "https://scholar.google.com/citations?user=XyZ",
        )];
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_from_lookup_invalid_port() {
        let vars = [
            ("SERPAPI_KEY", "secret"),
            ("SCHOLAR_PROFILE_URL", "https://scholar.google.com/citations?user=XyZ"),
            ("PORT", "not-a-port"),
        ];
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }
}
