//! Error types for mendeley-api.

use serde_json::Value;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument(message.into()))
    }

    /// The underlying client error, if this wraps one.
    pub fn client_error(&self) -> Option<&mendeley_client::Error> {
        self.source.as_ref()?.downcast_ref()
    }

    /// HTTP status of the failed request, when known.
    pub fn status(&self) -> Option<u16> {
        self.client_error()?.status()
    }

    /// Decoded error body returned by the server, when present.
    pub fn body(&self) -> Option<&Value> {
        self.client_error()?.body()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("Client error: {0}")]
    Client(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<mendeley_client::Error> for Error {
    fn from(err: mendeley_client::Error) -> Self {
        Error {
            kind: ErrorKind::Client(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::InvalidArgument(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}
