//! Environment-backed configuration.

use anyhow::{Context, Result};

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Endpoint of the external translation service.
    pub translator_api_url: String,
    /// Bearer token for the translation service.
    pub translator_api_key: String,
    /// Path of the persistent translation cache database.
    pub cache_path: String,
    /// Locale assumed for resources whose filename has no locale suffix.
    pub default_locale: String,
    /// Per-request timeout for service calls.
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables. The translator
    /// endpoint and key are required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let translator_api_url = std::env::var("TRANSLATOR_API_URL")
            .context("TRANSLATOR_API_URL environment variable is required")?;
        let translator_api_key = std::env::var("TRANSLATOR_API_KEY")
            .context("TRANSLATOR_API_KEY environment variable is required")?;

        let cache_path = std::env::var("TRANSLATION_CACHE_PATH")
            .unwrap_or_else(|_| "translation_cache.db".to_string());
        let default_locale =
            std::env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en-US".to_string());

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            translator_api_url,
            translator_api_key,
            cache_path,
            default_locale,
            request_timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // Mutates process-global environment; any future test that reads
    // these variables must also be #[serial].
    #[test]
    #[serial]
    fn test_from_env() {
        std::env::remove_var("TRANSLATOR_API_URL");
        std::env::remove_var("TRANSLATOR_API_KEY");
        let result = Config::from_env();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("TRANSLATOR_API_URL"));

        std::env::remove_var("TRANSLATION_CACHE_PATH");
        std::env::remove_var("DEFAULT_LOCALE");
        std::env::remove_var("REQUEST_TIMEOUT_SECS");
        std::env::set_var("TRANSLATOR_API_URL", "http://localhost:1/translate");
        std::env::set_var("TRANSLATOR_API_KEY", "k");

        let config = Config::from_env().expect("config");
        assert_eq!(config.cache_path, "translation_cache.db");
        assert_eq!(config.default_locale, "en-US");
        assert_eq!(config.request_timeout_secs, 30);

        std::env::remove_var("TRANSLATOR_API_URL");
        std::env::remove_var("TRANSLATOR_API_KEY");
    }
}
