//! Catalog entities and the action API envelope.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Envelope wrapping every action API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionResponse<T> {
    #[serde(default)]
    pub help: Option<String>,
    pub success: bool,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<ActionError>,
}

/// Error object of a failed action.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionError {
    #[serde(rename = "__type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Per-field validation messages and anything else the server adds.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Server-side error types with dedicated client errors.
pub(crate) const AUTHORIZATION_ERROR_TYPE: &str = "Authorization Error";
pub(crate) const NOT_FOUND_ERROR_TYPE: &str = "Not Found Error";

/// A dataset (`package` in action API terms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub license_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub metadata_created: Option<String>,
    #[serde(default)]
    pub metadata_modified: Option<String>,
    #[serde(default)]
    pub organization: Option<Organization>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub extras: Vec<Extra>,
}

/// A downloadable resource attached to a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub package_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// An organization owning datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub package_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Free-form key/value metadata on a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extra {
    pub key: String,
    pub value: serde_json::Value,
}

/// One page of `package_search` results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResult<T> {
    pub count: u64,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}
