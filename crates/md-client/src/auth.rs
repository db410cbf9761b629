//! The auth-mode hook consulted when building the `Authorization` header.
//!
//! Token acquisition lives outside this crate. A flow only has to say which
//! bearer token, if any, the next request should carry.

use std::fmt;
use std::sync::Arc;

/// A source of access tokens.
pub trait AuthFlow: Send + Sync {
    /// Short name of the flow, for logs.
    fn name(&self) -> &str;

    /// The access token to send, or None to send the request unauthenticated.
    fn access_token(&self) -> Option<String>;
}

/// A fixed bearer token, e.g. one obtained by an implicit grant.
///
/// The token is redacted in Debug output.
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticToken")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl AuthFlow for StaticToken {
    fn name(&self) -> &str {
        "static-token"
    }

    fn access_token(&self) -> Option<String> {
        if self.token.is_empty() {
            None
        } else {
            Some(self.token.clone())
        }
    }
}

/// No authentication at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl AuthFlow for NoAuth {
    fn name(&self) -> &str {
        "none"
    }

    fn access_token(&self) -> Option<String> {
        None
    }
}

/// The current auth mode: an opaque, cheaply cloneable handle to a flow.
#[derive(Clone)]
pub struct AuthMode(Arc<dyn AuthFlow>);

impl AuthMode {
    pub fn new(flow: impl AuthFlow + 'static) -> Self {
        Self(Arc::new(flow))
    }

    pub fn from_arc(flow: Arc<dyn AuthFlow>) -> Self {
        Self(flow)
    }

    /// Shorthand for a [`StaticToken`] mode.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(StaticToken::new(token))
    }

    pub fn none() -> Self {
        Self::new(NoAuth)
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// Value for the `Authorization` header, if the flow has a token.
    pub fn authorization(&self) -> Option<String> {
        self.0.access_token().map(|token| format!("Bearer {}", token))
    }
}

impl Default for AuthMode {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthMode").field(&self.name()).finish()
    }
}
