//! Client configuration.

use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("ckan-rs/", env!("CARGO_PKG_VERSION"));

/// Catalog client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) timeout: Duration,
    pub(crate) user_agent: String,
}

impl Config {
    /// Get the catalog base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the API key, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the user agent.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Builder for the catalog client.
#[derive(Debug)]
pub struct CatalogClientBuilder {
    base_url: String,
    api_key: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl CatalogClientBuilder {
    /// Create a new builder for the catalog at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: None,
            user_agent: None,
        }
    }

    /// Set the API key sent in the `Authorization` header.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the configuration.
    pub(crate) fn build_config(self) -> Result<Config, crate::Error> {
        let base_url = self.base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(crate::Error::Config("base_url cannot be empty".into()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(crate::Error::Config(format!(
                "base_url must be an http(s) URL, got {base_url:?}"
            )));
        }
        if self.api_key.as_deref() == Some("") {
            return Err(crate::Error::Config("api_key cannot be empty".into()));
        }

        Ok(Config {
            base_url: base_url.to_owned(),
            api_key: self.api_key,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_builder_defaults() {
        let config = CatalogClientBuilder::new("https://demo.ckan.org")
            .build_config()
            .unwrap();

        assert_eq!(config.base_url(), "https://demo.ckan.org");
        assert_eq!(config.api_key(), None);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.user_agent(), DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CatalogClientBuilder::new("http://localhost:5000/")
            .api_key("tok_123")
            .timeout(Duration::from_secs(5))
            .user_agent("harvester/2.0")
            .build_config()
            .unwrap();

        assert_eq!(config.base_url(), "http://localhost:5000");
        assert_eq!(config.api_key(), Some("tok_123"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.user_agent(), "harvester/2.0");
    }

    #[test]
    fn test_builder_empty_base_url_fails() {
        let err = CatalogClientBuilder::new("").build_config().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = CatalogClientBuilder::new("/").build_config().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_builder_rejects_non_http_url() {
        let result = CatalogClientBuilder::new("ftp://demo.ckan.org").build_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_empty_api_key_fails() {
        let result = CatalogClientBuilder::new("https://demo.ckan.org")
            .api_key("")
            .build_config();
        assert!(result.is_err());
    }
}
