//! Error types for mendeley-client.

use serde_json::Value;

/// Result type alias for mendeley-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Status code the server uses when an upstream gateway gave up.
pub const GATEWAY_TIMEOUT: u16 = 504;

/// Error type for mendeley-client operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// HTTP status of the failed response, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Http { status, .. } | ErrorKind::RedirectFollow { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Decoded body of the failed response, when one was returned.
    pub fn body(&self) -> Option<&Value> {
        match &self.kind {
            ErrorKind::Http { body, .. } | ErrorKind::RedirectFollow { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Returns true if this error may be retried by a page-follow call.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns true if the failure came from the transport (network or HTTP status).
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Http { .. } | ErrorKind::Timeout | ErrorKind::Connection(_)
        )
    }

    /// Re-tag a transport failure as a failure of the location-follow leg.
    pub(crate) fn into_redirect_failure(self) -> Self {
        let kind = match self.kind {
            ErrorKind::Http {
                status,
                message,
                body,
            } => ErrorKind::RedirectFollow {
                status,
                message,
                body,
            },
            other => other,
        };
        Self {
            kind,
            source: self.source,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// A URI template references a variable that the endpoint does not declare.
    #[error("Malformed endpoint: template {template} references undeclared variable {variable}")]
    MalformedEndpoint { template: String, variable: String },

    /// A call did not supply a value for a template placeholder.
    #[error("Endpoint requires {0}")]
    MissingTemplateVariable(String),

    /// Pagination-follow requested for a relation that has no stored link.
    #[error("No pagination link for rel {0}")]
    NoPaginationLink(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP error: {status} {message}")]
    Http {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// The GET issued to a returned location failed.
    #[error("Location follow failed: {status} {message}")]
    RedirectFollow {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ErrorKind {
    /// Returns true if this error kind is retryable.
    ///
    /// Only a gateway timeout qualifies, and only page-follow calls act on it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Http { status, .. } if *status == GATEWAY_TIMEOUT)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            ErrorKind::Http {
                status: status.as_u16(),
                message: err.to_string(),
                body: None,
            }
        } else {
            ErrorKind::Other(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Error::with_source(ErrorKind::Json(format!("query parameters: {}", err)), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}
