//! HTTP transport for calling catalog actions.

use crate::config::Config;
use crate::error::{ApiError, AuthorizationError, ClientRef, ErrorDetails, NotFoundError, ResponseSnapshot};
use crate::types::{ActionResponse, AUTHORIZATION_ERROR_TYPE, NOT_FOUND_ERROR_TYPE};
use crate::Error;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// JSON type an action's `result` must have before it is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// Any JSON value.
    Any,
    /// A JSON object; arrays are rejected even when the target type is a struct.
    Object,
}

impl ResultShape {
    fn accepts(self, value: &Value) -> bool {
        match self {
            ResultShape::Any => true,
            ResultShape::Object => value.is_object(),
        }
    }
}

/// HTTP transport for the action API.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    client_ref: ClientRef,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    pub fn new(config: &Config, client_ref: ClientRef) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url().to_owned(),
            api_key: config.api_key().map(String::from),
            client_ref,
        })
    }

    pub fn client_ref(&self) -> &ClientRef {
        &self.client_ref
    }

    /// Endpoint of a named action.
    pub fn action_url(&self, action: &str) -> String {
        format!("{}/api/3/action/{}", self.base_url, action)
    }

    /// Call an action and decode its `result`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        params: &[(&str, String)],
        shape: ResultShape,
    ) -> Result<T, Error> {
        let url = self.action_url(action);
        debug!(url = %url, param_count = params.len(), "calling action");

        let mut request = self.client.get(&url).query(params);
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, key.as_str());
        }

        let response = request.send().await?;
        let snapshot = ResponseSnapshot::capture(response).await?;
        let status = snapshot.status();

        let result = decode(action, shape, &self.client_ref, snapshot);
        match &result {
            Ok(_) => debug!(action, status = %status, "action succeeded"),
            Err(e) => warn!(action, status = %status, error = %e.describe(), "action failed"),
        }
        result
    }
}

/// Classify a completed exchange and decode the action result.
pub(crate) fn decode<T: DeserializeOwned>(
    action: &str,
    shape: ResultShape,
    client: &ClientRef,
    snapshot: ResponseSnapshot,
) -> Result<T, Error> {
    let status = snapshot.status();
    let envelope = serde_json::from_str::<ActionResponse<Value>>(snapshot.body());

    let reported = envelope.as_ref().ok().and_then(|e| e.error.as_ref());
    let error_type = reported.and_then(|e| e.error_type.clone());
    let message = reported.and_then(|e| e.message.clone());

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || error_type.as_deref() == Some(AUTHORIZATION_ERROR_TYPE)
    {
        let message = message.unwrap_or_else(|| format!("not authorized to call {action}"));
        return Err(
            AuthorizationError::new(message, client, ErrorDetails::with_response(snapshot)).into(),
        );
    }

    // A 404 without an action envelope comes from a wrong mount point or a proxy,
    // not from the catalog; it falls through to ApiError with the snapshot.
    if (status == StatusCode::NOT_FOUND && envelope.is_ok())
        || error_type.as_deref() == Some(NOT_FOUND_ERROR_TYPE)
    {
        let message = message.unwrap_or_else(|| format!("{action}: not found"));
        return Err(NotFoundError::new(message).into());
    }

    let envelope = match envelope {
        Ok(envelope) => envelope,
        Err(e) => {
            let message = format!(
                "{action}: invalid response body (HTTP {})",
                status.as_u16()
            );
            return Err(ApiError::new(
                message,
                client,
                None,
                ErrorDetails::with_response(snapshot).cause(e),
            )
            .into());
        }
    };

    if !status.is_success() || !envelope.success {
        let message = message.unwrap_or_else(|| match &error_type {
            Some(kind) => format!("{action}: {kind}"),
            None => format!("{action} failed with HTTP {}", status.as_u16()),
        });
        return Err(
            ApiError::new(message, client, error_type, ErrorDetails::with_response(snapshot))
                .into(),
        );
    }

    let Some(result) = envelope.result else {
        return Err(ApiError::new(
            format!("{action}: response has no result"),
            client,
            None,
            ErrorDetails::with_response(snapshot),
        )
        .into());
    };

    if !shape.accepts(&result) {
        return Err(ApiError::new(
            format!("{action}: expected an object result"),
            client,
            None,
            ErrorDetails::with_response(snapshot),
        )
        .into());
    }

    serde_json::from_value(result).map_err(|e| {
        Error::from(ApiError::new(
            format!("{action}: unexpected result shape"),
            client,
            None,
            ErrorDetails::with_response(snapshot).cause(e),
        ))
    })
}
