//! Catalog client implementation.

use crate::config::{CatalogClientBuilder, Config};
use crate::error::ClientRef;
use crate::transport::{HttpTransport, ResultShape};
use crate::types::{Dataset, Organization, Resource, SearchResult};
use crate::Error;
use serde::de::DeserializeOwned;
use tracing::{info, instrument};

/// Client for a CKAN catalog's action API.
///
/// Every call returns [`Error`]; permission failures surface as
/// [`Error::Authorization`] and missing entities as [`Error::NotFound`].
///
/// # Example
///
/// ```rust,no_run
/// use ckan::{CatalogClient, Error};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Error> {
///     let client = CatalogClient::builder("https://demo.ckan.org")
///         .api_key("my-token")
///         .build()?;
///
///     match client.dataset("air-quality").await {
///         Ok(dataset) => println!("{} resources", dataset.resources.len()),
///         Err(Error::NotFound(e)) => println!("missing: {}", e.message()),
///         Err(Error::Authorization(e)) => println!("denied: {}", e.message()),
///         Err(e) => return Err(e),
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct CatalogClient {
    config: Config,
    transport: HttpTransport,
}

impl CatalogClient {
    /// Create a new builder for the catalog at `base_url`.
    pub fn builder(base_url: impl Into<String>) -> CatalogClientBuilder {
        CatalogClientBuilder::new(base_url)
    }

    /// Create a new client from config.
    pub(crate) fn from_config(config: Config) -> Result<Self, Error> {
        let client_ref = ClientRef::new(config.base_url());
        let transport = HttpTransport::new(&config, client_ref)?;

        info!(
            client = transport.client_ref().id(),
            base_url = %config.base_url(),
            "catalog client created"
        );

        Ok(Self { config, transport })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Identity attached to errors raised by this client.
    pub fn client_ref(&self) -> &ClientRef {
        self.transport.client_ref()
    }

    // ============================================
    // DATASETS
    // ============================================

    /// Fetch a dataset by id or name.
    #[instrument(skip(self))]
    pub async fn dataset(&self, id: &str) -> Result<Dataset, Error> {
        self.transport
            .call("package_show", &[("id", id.to_owned())], ResultShape::Object)
            .await
    }

    /// List dataset names, optionally paged.
    #[instrument(skip(self))]
    pub async fn dataset_list(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<String>, Error> {
        let mut params = Vec::new();
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = offset {
            params.push(("offset", offset.to_string()));
        }
        self.transport
            .call("package_list", &params, ResultShape::Any)
            .await
    }

    /// Search datasets with a Solr query.
    #[instrument(skip(self))]
    pub async fn search_datasets(
        &self,
        query: &str,
        rows: u32,
        start: u32,
    ) -> Result<SearchResult<Dataset>, Error> {
        let params = [
            ("q", query.to_owned()),
            ("rows", rows.to_string()),
            ("start", start.to_string()),
        ];
        self.transport
            .call("package_search", &params, ResultShape::Object)
            .await
    }

    // ============================================
    // ORGANIZATIONS
    // ============================================

    /// Fetch an organization by id or name.
    #[instrument(skip(self))]
    pub async fn organization(&self, id: &str) -> Result<Organization, Error> {
        self.transport
            .call("organization_show", &[("id", id.to_owned())], ResultShape::Object)
            .await
    }

    /// List organization names.
    #[instrument(skip(self))]
    pub async fn organization_list(&self) -> Result<Vec<String>, Error> {
        self.transport
            .call("organization_list", &[], ResultShape::Any)
            .await
    }

    // ============================================
    // RESOURCES
    // ============================================

    /// Fetch a resource by id.
    #[instrument(skip(self))]
    pub async fn resource(&self, id: &str) -> Result<Resource, Error> {
        self.transport
            .call("resource_show", &[("id", id.to_owned())], ResultShape::Object)
            .await
    }

    // ============================================
    // RAW
    // ============================================

    /// Call any action and decode its `result` into `T`.
    #[instrument(skip(self, params))]
    pub async fn action<T: DeserializeOwned>(
        &self,
        name: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        self.transport.call(name, params, ResultShape::Any).await
    }
}

impl CatalogClientBuilder {
    /// Build the catalog client.
    pub fn build(self) -> Result<CatalogClient, Error> {
        let config = self.build_config()?;
        CatalogClient::from_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_assigns_client_ref() {
        let a = CatalogClient::builder("https://demo.ckan.org/").build().unwrap();
        let b = CatalogClient::builder("https://demo.ckan.org").build().unwrap();

        assert_eq!(a.client_ref().base_url(), "https://demo.ckan.org");
        assert_ne!(a.client_ref(), b.client_ref());
        assert_eq!(a.config().base_url(), a.client_ref().base_url());
    }

    #[test]
    fn test_build_propagates_config_error() {
        let err = CatalogClient::builder("").build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
