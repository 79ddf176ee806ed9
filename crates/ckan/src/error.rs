//! Error types for the CKAN client.
//!
//! Every fallible call returns [`Error`]. The kinds callers most often branch
//! on, [`AuthorizationError`] and [`NotFoundError`], are standalone types as
//! well, so they can be matched on, downcast from a boxed error, or built by
//! other transports.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::{self, Write as _};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Underlying error chained to a higher-level failure.
pub type Cause = Box<dyn StdError + Send + Sync + 'static>;

const DEFAULT_AUTHORIZATION_MESSAGE: &str = "authorization failed";
const DEFAULT_NOT_FOUND_MESSAGE: &str = "not found";
const DEFAULT_API_MESSAGE: &str = "catalog request failed";
const DEFAULT_CONFIG_MESSAGE: &str = "invalid configuration";
const DEFAULT_OTHER_MESSAGE: &str = "unspecified error";

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

fn non_empty(message: String, fallback: &str) -> String {
    if message.is_empty() {
        fallback.to_owned()
    } else {
        message
    }
}

fn display_or(value: &dyn fmt::Display, fallback: &str) -> String {
    non_empty(value.to_string(), fallback)
}

fn as_std(cause: &Cause) -> &(dyn StdError + 'static) {
    &**cause
}

// ============================================
// CONTEXT
// ============================================

/// Identity of the client instance that produced an error.
///
/// Shares the identity only; holding one does not keep the client's
/// connection pool alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRef(Arc<ClientIdentity>);

#[derive(Debug, PartialEq, Eq)]
struct ClientIdentity {
    id: u64,
    base_url: String,
}

impl ClientRef {
    /// Allocate a new identity for a client talking to `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self(Arc::new(ClientIdentity {
            id: NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed),
            base_url: base_url.into(),
        }))
    }

    /// Process-unique client id.
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Base URL of the catalog the client talks to.
    pub fn base_url(&self) -> &str {
        &self.0.base_url
    }
}

impl fmt::Display for ClientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client #{} ({})", self.0.id, self.0.base_url)
    }
}

/// Captured copy of a failed HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSnapshot {
    status: StatusCode,
    url: String,
    headers: HeaderMap,
    body: String,
}

impl ResponseSnapshot {
    /// Create a snapshot from already-read response parts.
    pub fn new(
        status: StatusCode,
        url: impl Into<String>,
        headers: HeaderMap,
        body: impl Into<String>,
    ) -> Self {
        Self {
            status,
            url: url.into(),
            headers,
            body: body.into(),
        }
    }

    /// Consume a response, reading its body into a snapshot.
    pub async fn capture(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(Self::new(status, url, headers, body))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Optional parts attached to a client-side failure.
///
/// Absent parts stay `None`; there is no placeholder response.
#[derive(Debug, Default)]
pub struct ErrorDetails {
    pub response: Option<ResponseSnapshot>,
    pub cause: Option<Cause>,
}

impl ErrorDetails {
    /// No response and no cause.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_response(response: ResponseSnapshot) -> Self {
        Self::none().response(response)
    }

    pub fn with_cause(cause: impl Into<Cause>) -> Self {
        Self::none().cause(cause)
    }

    /// Attach the failed response.
    pub fn response(mut self, response: ResponseSnapshot) -> Self {
        self.response = Some(response);
        self
    }

    /// Attach an underlying error.
    pub fn cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

// ============================================
// AUTHORIZATION
// ============================================

/// The catalog refused the action for the credential in use.
#[derive(Debug)]
pub struct AuthorizationError {
    message: String,
    client: ClientRef,
    response: Option<ResponseSnapshot>,
    cause: Option<Cause>,
}

impl AuthorizationError {
    /// Create an authorization error.
    ///
    /// An empty `message` is replaced by `"authorization failed"`.
    ///
    /// # Example
    ///
    /// ```
    /// use ckan::{AuthorizationError, ClientRef, ErrorDetails};
    ///
    /// let client = ClientRef::new("https://demo.ckan.org");
    /// let err = AuthorizationError::new("user lacks write permission", &client, ErrorDetails::none());
    ///
    /// assert_eq!(err.message(), "user lacks write permission");
    /// assert!(err.response().is_none());
    /// ```
    pub fn new(message: impl Into<String>, client: &ClientRef, details: ErrorDetails) -> Self {
        Self {
            message: non_empty(message.into(), DEFAULT_AUTHORIZATION_MESSAGE),
            client: client.clone(),
            response: details.response,
            cause: details.cause,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn client(&self) -> &ClientRef {
        &self.client
    }

    pub fn response(&self) -> Option<&ResponseSnapshot> {
        self.response.as_ref()
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for AuthorizationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().map(as_std)
    }
}

// ============================================
// NOT FOUND
// ============================================

/// A requested entity does not exist.
///
/// Generic across entity kinds; it carries no entity identifiers.
#[derive(Debug)]
pub struct NotFoundError {
    message: String,
    cause: Option<Cause>,
}

impl NotFoundError {
    /// Create a not-found error. An empty `message` is replaced by `"not found"`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: non_empty(message.into(), DEFAULT_NOT_FOUND_MESSAGE),
            cause: None,
        }
    }

    /// Create a not-found error chained to an underlying error.
    pub fn with_cause(message: impl Into<String>, cause: impl Into<Cause>) -> Self {
        Self {
            cause: Some(cause.into()),
            ..Self::new(message)
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for NotFoundError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().map(as_std)
    }
}

// ============================================
// GENERIC CATALOG FAILURE
// ============================================

/// Any other failure reported by, or while talking to, the catalog.
#[derive(Debug)]
pub struct ApiError {
    message: String,
    client: ClientRef,
    error_type: Option<String>,
    response: Option<ResponseSnapshot>,
    cause: Option<Cause>,
}

impl ApiError {
    /// Create a catalog error. `error_type` is the server-reported `__type`, if any.
    pub fn new(
        message: impl Into<String>,
        client: &ClientRef,
        error_type: Option<String>,
        details: ErrorDetails,
    ) -> Self {
        Self {
            message: non_empty(message.into(), DEFAULT_API_MESSAGE),
            client: client.clone(),
            error_type,
            response: details.response,
            cause: details.cause,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn client(&self) -> &ClientRef {
        &self.client
    }

    /// Server-reported error type, e.g. `"Validation Error"`.
    pub fn error_type(&self) -> Option<&str> {
        self.error_type.as_deref()
    }

    pub fn response(&self) -> Option<&ResponseSnapshot> {
        self.response.as_ref()
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().map(as_std)
    }
}

// ============================================
// TOP-LEVEL
// ============================================

/// Errors that can occur when using the CKAN client.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Permission denied for the requested action.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// Requested entity does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Catalog reported a failure, or answered with something unusable.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// HTTP request failed before a response was read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {}", display_or(.0, DEFAULT_CONFIG_MESSAGE))]
    Config(String),

    /// Failure kinds not modelled by this crate.
    #[error("{}", display_or(.0, DEFAULT_OTHER_MESSAGE))]
    Other(#[from] Cause),
}

/// Discriminant of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    Authorization,
    NotFound,
    Api,
    Http,
    Config,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Authorization => "authorization error",
            ErrorKind::NotFound => "not found",
            ErrorKind::Api => "catalog error",
            ErrorKind::Http => "http error",
            ErrorKind::Config => "configuration error",
            ErrorKind::Other => "error",
        };
        f.write_str(label)
    }
}

impl Error {
    /// Wrap an error kind this crate does not model.
    pub fn other(error: impl Into<Cause>) -> Self {
        Error::Other(error.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Authorization(_) => ErrorKind::Authorization,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Api(_) => ErrorKind::Api,
            Error::Http(_) => ErrorKind::Http,
            Error::Config(_) => ErrorKind::Config,
            Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Human-readable message, without the cause chain. Never empty.
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Error::Authorization(e) => Cow::Borrowed(e.message()),
            Error::NotFound(e) => Cow::Borrowed(e.message()),
            Error::Api(e) => Cow::Borrowed(e.message()),
            Error::Config(msg) if msg.is_empty() => Cow::Borrowed(DEFAULT_CONFIG_MESSAGE),
            Error::Config(msg) => Cow::Borrowed(msg.as_str()),
            Error::Http(e) => Cow::Owned(e.to_string()),
            Error::Other(e) => Cow::Owned(display_or(e, DEFAULT_OTHER_MESSAGE)),
        }
    }

    /// First error in the chain below this one.
    pub fn cause(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Authorization(e) => e.source(),
            Error::NotFound(e) => e.source(),
            Error::Api(e) => e.source(),
            Error::Http(e) => e.source(),
            Error::Other(e) => e.source(),
            Error::Config(_) => None,
        }
    }

    /// Failed response captured when the error was classified.
    pub fn response(&self) -> Option<&ResponseSnapshot> {
        match self {
            Error::Authorization(e) => e.response(),
            Error::Api(e) => e.response(),
            _ => None,
        }
    }

    /// Kind, message, response status and the full cause chain on one line.
    ///
    /// ```text
    /// authorization error: Access denied [HTTP 403 https://demo.ckan.org/api/3/action/package_show]
    /// ```
    pub fn describe(&self) -> String {
        let mut out = format!("{}: {}", self.kind(), self.message());
        if let Some(response) = self.response() {
            let _ = write!(
                out,
                " [HTTP {} {}]",
                response.status().as_u16(),
                response.url()
            );
        }
        let mut next = self.cause();
        while let Some(cause) = next {
            let _ = write!(out, ": caused by: {}", cause);
            next = cause.source();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn client() -> ClientRef {
        ClientRef::new("https://catalog.example.com")
    }

    fn forbidden() -> ResponseSnapshot {
        ResponseSnapshot::new(
            StatusCode::FORBIDDEN,
            "https://catalog.example.com/api/3/action/package_update",
            HeaderMap::new(),
            r#"{"success": false, "error": {"__type": "Authorization Error"}}"#,
        )
    }

    #[test]
    fn test_authorization_keeps_message_for_every_variant() {
        let client = client();
        let msg = "  user lacks write permission ";

        let variants = [
            AuthorizationError::new(msg, &client, ErrorDetails::none()),
            AuthorizationError::new(msg, &client, ErrorDetails::with_cause(io::Error::other("x"))),
            AuthorizationError::new(msg, &client, ErrorDetails::with_response(forbidden())),
            AuthorizationError::new(
                msg,
                &client,
                ErrorDetails::with_response(forbidden()).cause(io::Error::other("x")),
            ),
        ];

        for err in &variants {
            assert_eq!(err.message(), msg);
            assert_eq!(err.client(), &client);
        }
    }

    #[test]
    fn test_authorization_without_response_has_none() {
        let err = AuthorizationError::new(
            "user lacks write permission",
            &client(),
            ErrorDetails::with_cause(io::Error::other("tls handshake rejected")),
        );

        assert!(err.response().is_none());
        assert!(err.cause().is_some());
    }

    #[test]
    fn test_authorization_with_response_keeps_it() {
        let err = AuthorizationError::new(
            "denied",
            &client(),
            ErrorDetails::with_response(forbidden()),
        );

        assert_eq!(err.response(), Some(&forbidden()));
        assert!(err.cause().is_none());
    }

    #[test]
    fn test_authorization_scenario_without_context() {
        let client_x = client();
        let err = AuthorizationError::new("user lacks write permission", &client_x, ErrorDetails::none());

        assert_eq!(err.message(), "user lacks write permission");
        assert!(err.response().is_none());
        assert!(err.cause().is_none());
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "user lacks write permission");
    }

    #[test]
    fn test_not_found_cause_absent_unless_supplied() {
        let err = NotFoundError::new("resource abc not found");
        assert!(err.cause().is_none());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_not_found_scenario_with_io_cause() {
        let err = NotFoundError::with_cause(
            "dataset xyz not found",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );

        assert_eq!(err.message(), "dataset xyz not found");
        let cause = err
            .cause()
            .and_then(|c| c.downcast_ref::<io::Error>())
            .expect("io cause");
        assert_eq!(cause.kind(), io::ErrorKind::NotFound);
        assert_eq!(cause.to_string(), "no such file");
    }

    #[test]
    fn test_empty_message_replaced() {
        assert_eq!(NotFoundError::new("").message(), "not found");
        assert_eq!(
            AuthorizationError::new("", &client(), ErrorDetails::none()).message(),
            "authorization failed"
        );
        assert_eq!(
            ApiError::new(String::new(), &client(), None, ErrorDetails::none()).message(),
            "catalog request failed"
        );
    }

    fn lookup(found: bool) -> Result<(), Error> {
        if !found {
            return Err(NotFoundError::new("organization acme not found").into());
        }
        Err(AuthorizationError::new("denied", &client(), ErrorDetails::none()).into())
    }

    fn outer(found: bool) -> Result<(), Error> {
        lookup(found)?;
        Ok(())
    }

    #[test]
    fn test_kind_survives_propagation() {
        assert_eq!(outer(false).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(outer(true).unwrap_err().kind(), ErrorKind::Authorization);

        let boxed: Box<dyn StdError + Send + Sync> = Box::new(outer(true).unwrap_err());
        match boxed.downcast_ref::<Error>() {
            Some(Error::Authorization(e)) => assert_eq!(e.message(), "denied"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_leaf_downcasts_from_box() {
        let boxed: Cause = Box::new(NotFoundError::new("tag geo not found"));
        let err = boxed.downcast::<NotFoundError>().unwrap();
        assert_eq!(err.message(), "tag geo not found");
    }

    #[test]
    fn test_describe_includes_response_and_chain() {
        let inner = io::Error::other("connection reset");
        let err = Error::from(AuthorizationError::new(
            "Access denied",
            &client(),
            ErrorDetails::with_response(forbidden()).cause(inner),
        ));

        assert_eq!(
            err.describe(),
            "authorization error: Access denied \
             [HTTP 403 https://catalog.example.com/api/3/action/package_update]: \
             caused by: connection reset"
        );
        assert_eq!(err.to_string(), "Access denied");
    }

    #[test]
    fn test_response_only_for_contextual_kinds() {
        let err = Error::from(NotFoundError::new("gone"));
        assert!(err.response().is_none());

        let err = Error::Config("base_url cannot be empty".into());
        assert_eq!(err.message(), "base_url cannot be empty");
        assert!(err.cause().is_none());
        assert_eq!(err.describe(), "configuration error: base_url cannot be empty");
    }

    #[test]
    fn test_empty_messages_on_open_variants_fall_back() {
        let err = Error::other("");
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(err.message(), "unspecified error");
        assert_eq!(err.to_string(), "unspecified error");
        assert_eq!(err.describe(), "error: unspecified error");

        let err = Error::Config(String::new());
        assert_eq!(err.message(), "invalid configuration");
        assert_eq!(err.to_string(), "Invalid configuration: invalid configuration");
        assert_eq!(err.describe(), "configuration error: invalid configuration");
    }

    #[test]
    fn test_other_is_extension_point() {
        let err = Error::other("catalog-specific failure");
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(err.to_string(), "catalog-specific failure");
    }

    #[test]
    fn test_client_refs_are_distinct() {
        let a = ClientRef::new("https://a.example.com");
        let b = ClientRef::new("https://a.example.com");

        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(a.base_url(), "https://a.example.com");
    }

    #[test]
    fn test_errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<Error>();
        assert_send_sync::<AuthorizationError>();
        assert_send_sync::<NotFoundError>();
        assert_send_sync::<ApiError>();
        assert_send_sync::<ResponseSnapshot>();
    }
}
