//! Client library for CKAN data catalogs.
//!
//! # Example
//!
//! ```rust,no_run
//! use ckan::{CatalogClient, ErrorKind};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ckan::Error> {
//!     let client = CatalogClient::builder("https://demo.ckan.org")
//!         .timeout(Duration::from_secs(10))
//!         .build()?;
//!
//!     let page = client.search_datasets("air quality", 10, 0).await?;
//!     println!("{} datasets", page.count);
//!
//!     if let Err(e) = client.organization("no-such-org").await {
//!         assert_eq!(e.kind(), ErrorKind::NotFound);
//!         eprintln!("{}", e.describe());
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod transport;
pub mod types;

pub use client::CatalogClient;
pub use config::{CatalogClientBuilder, Config, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use error::{
    ApiError, AuthorizationError, Cause, ClientRef, Error, ErrorDetails, ErrorKind, NotFoundError,
    ResponseSnapshot,
};
pub use types::{ActionError, ActionResponse, Dataset, Extra, Organization, Resource, SearchResult, Tag};
