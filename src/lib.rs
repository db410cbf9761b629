//! # mendeley-sdk
//!
//! A Mendeley API client library for Rust.
//!
//! Endpoints are declared as data and turned into async request functions
//! that track pagination per collection, retry a gateway timeout once when
//! following a page link, and fetch created resources through `Location`.
//!
//! ## Security
//!
//! - Access tokens are redacted in Debug output
//! - Tracing spans record method and URL only, never headers or bodies
//! - Error messages sanitize any credential data
//!
//! ## Crates
//!
//! - **mendeley-client** - Request construction core: URI templates, headers, pagination, retry
//! - **mendeley-api** - Resources: catalog, documents, files, folders, groups
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mendeley_sdk::{MendeleyApi, Settings, AuthMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::new("https://api.mendeley.com", AuthMode::bearer("token"))?;
//!     let api = MendeleyApi::new(settings)?;
//!
//!     let docs = api.documents.list(&serde_json::json!({"limit": 20})).await?;
//!     println!("{} of {}", docs, api.documents.count());
//!
//!     while api.documents.pagination_links().next.is_some() {
//!         let page = api.documents.next_page().await?;
//!         println!("{page}");
//!     }
//!
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
#[cfg(feature = "api")]
pub use mendeley_api as api;
#[cfg(feature = "client")]
pub use mendeley_client as client;

// Re-export commonly used types at the top level
#[cfg(feature = "api")]
pub use mendeley_api::MendeleyApi;
#[cfg(feature = "client")]
pub use mendeley_client::{
    AuthFlow, AuthMode, ClientConfig, ClientContext, Endpoint, Pagination, RequestFactory,
    Settings, StaticToken,
};
