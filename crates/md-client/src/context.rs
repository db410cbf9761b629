//! Process-wide settings: base URL and current auth mode.
//!
//! The settings live in one shared [`ClientContext`]. Every call takes a
//! [`Settings`] snapshot when its request descriptor is built, so a change
//! only affects calls started after it.

use std::sync::{Arc, PoisonError, RwLock};

use crate::auth::{AuthFlow, AuthMode};
use crate::error::{Error, ErrorKind, Result};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.mendeley.com";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "MENDELEY_BASE_URL";

/// Environment variable holding a bearer token.
pub const ACCESS_TOKEN_ENV: &str = "MENDELEY_ACCESS_TOKEN";

/// A point-in-time copy of the settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub auth: AuthMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth: AuthMode::none(),
        }
    }
}

impl Settings {
    pub fn new(base_url: impl Into<String>, auth: AuthMode) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url.into())?,
            auth,
        })
    }

    /// Build settings from `MENDELEY_BASE_URL` and `MENDELEY_ACCESS_TOKEN`.
    ///
    /// Both are optional; missing values fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let auth = match std::env::var(ACCESS_TOKEN_ENV) {
            Ok(token) if !token.is_empty() => AuthMode::bearer(token),
            _ => AuthMode::none(),
        };
        Self::new(base_url, auth)
    }
}

fn normalize_base_url(base_url: String) -> Result<String> {
    let parsed = url::Url::parse(&base_url)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::new(ErrorKind::InvalidUrl(format!(
            "unsupported scheme {}",
            parsed.scheme()
        ))));
    }
    Ok(base_url.trim_end_matches('/').to_string())
}

/// Shared handle to the mutable settings.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    settings: Arc<RwLock<Settings>>,
}

impl ClientContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    /// Settings as of now. Taken once per call.
    pub fn snapshot(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn base_url(&self) -> String {
        self.snapshot().base_url
    }

    /// Point subsequent calls at a different API root.
    pub fn set_base_url(&self, base_url: impl Into<String>) -> Result<()> {
        let base_url = normalize_base_url(base_url.into())?;
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .base_url = base_url;
        Ok(())
    }

    /// Switch the auth mode for subsequent calls.
    pub fn set_auth_mode(&self, auth: AuthMode) {
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .auth = auth;
    }

    pub fn set_auth_flow(&self, flow: impl AuthFlow + 'static) {
        self.set_auth_mode(AuthMode::new(flow));
    }
}
