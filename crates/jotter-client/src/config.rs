//! Data API connection settings.

use jotter_core::defaults;
use jotter_core::{Error, Result};

/// Configuration for the Data API backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataApiConfig {
    /// Base URL of the API, without a trailing path.
    pub base_url: String,
    /// API token sent as the `token` query parameter.
    pub token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Page size used for paginated requests.
    pub page_limit: u32,
}

impl Default for DataApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_URL.to_string(),
            token: None,
            timeout_seconds: defaults::API_TIMEOUT_SECS,
            page_limit: defaults::PAGE_LIMIT,
        }
    }
}

impl DataApiConfig {
    /// Read configuration from the environment.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `JOTTER_API_URL` | `http://127.0.0.1:41184` |
    /// | `JOTTER_API_TOKEN` | (none) |
    /// | `JOTTER_TIMEOUT_SECS` | 30 |
    /// | `JOTTER_PAGE_LIMIT` | 100 |
    pub fn from_env() -> Result<Self> {
        let config = Self {
            base_url: std::env::var("JOTTER_API_URL")
                .unwrap_or_else(|_| defaults::API_URL.to_string()),
            token: std::env::var("JOTTER_API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            timeout_seconds: std::env::var("JOTTER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::API_TIMEOUT_SECS),
            page_limit: std::env::var("JOTTER_PAGE_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::PAGE_LIMIT),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the backend cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "API URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.page_limit == 0 || self.page_limit > defaults::PAGE_LIMIT {
            return Err(Error::Config(format!(
                "page limit must be between 1 and {}",
                defaults::PAGE_LIMIT
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(Error::Config("timeout must be at least 1 second".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DataApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_limit, 100);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = DataApiConfig {
            base_url: "ftp://localhost".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_page_limit() {
        let config = DataApiConfig {
            page_limit: 500,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("page limit"));
    }
}
