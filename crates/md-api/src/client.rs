//! Entry point bundling every resource behind one settings context.

use mendeley_client::{AuthFlow, AuthMode, ClientConfig, ClientContext, RequestFactory, Settings};

use crate::catalog::Catalog;
use crate::documents::Documents;
use crate::error::Result;
use crate::files::Files;
use crate::folders::Folders;
use crate::groups::Groups;

/// Mendeley API client.
///
/// Each resource tracks its own pagination cursor. Settings changes made
/// through [`set_base_url`](Self::set_base_url) or
/// [`set_auth_flow`](Self::set_auth_flow) apply to calls started afterwards.
///
/// # Example
///
/// ```rust,ignore
/// use mendeley_api::MendeleyApi;
///
/// let api = MendeleyApi::from_env()?;
/// let page = api.documents.list(&serde_json::json!({"limit": 50})).await?;
/// if api.documents.pagination_links().next.is_some() {
///     let more = api.documents.next_page().await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MendeleyApi {
    factory: RequestFactory,
    pub catalog: Catalog,
    pub documents: Documents,
    pub files: Files,
    pub folders: Folders,
    pub groups: Groups,
}

impl MendeleyApi {
    /// Create a client with default HTTP configuration.
    pub fn new(settings: Settings) -> Result<Self> {
        Self::with_config(settings, ClientConfig::default())
    }

    /// Create a client with custom HTTP configuration.
    pub fn with_config(settings: Settings, config: ClientConfig) -> Result<Self> {
        let factory = RequestFactory::with_config(ClientContext::new(settings), config)?;
        Self::from_factory(factory)
    }

    /// Create a client from `MENDELEY_BASE_URL` and `MENDELEY_ACCESS_TOKEN`.
    pub fn from_env() -> Result<Self> {
        Self::new(Settings::from_env()?)
    }

    /// Create a client over an existing factory, e.g. one with a custom transport.
    pub fn from_factory(factory: RequestFactory) -> Result<Self> {
        Ok(Self {
            catalog: Catalog::new(&factory)?,
            documents: Documents::new(&factory)?,
            files: Files::new(&factory)?,
            folders: Folders::new(&factory)?,
            groups: Groups::new(&factory)?,
            factory,
        })
    }

    pub fn factory(&self) -> &RequestFactory {
        &self.factory
    }

    pub fn base_url(&self) -> String {
        self.factory.context().base_url()
    }

    pub fn set_base_url(&self, base_url: impl Into<String>) -> Result<()> {
        Ok(self.factory.context().set_base_url(base_url)?)
    }

    pub fn set_auth_flow(&self, flow: impl AuthFlow + 'static) {
        self.factory.context().set_auth_flow(flow);
    }

    pub fn set_auth_mode(&self, auth: AuthMode) {
        self.factory.context().set_auth_mode(auth);
    }
}
