//! # mendeley-client
//!
//! Request construction core for the Mendeley REST API.
//!
//! This crate turns declarative endpoint descriptors into async request
//! functions:
//! - URI template expansion
//! - Header composition (literal, payload-derived and upload headers)
//! - Per-collection pagination state read from `Link` and `mendeley-count`
//! - A single bounded retry on gateway timeout for page-follow calls
//! - Create-then-fetch through the returned `Location`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Resource Modules                         │
//! │  (mendeley-api: catalog, documents, files, folders, groups) │
//! └─────────────────────────────────────────────────────────────┘
//!                              │  Endpoint + Pagination
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RequestFactory                           │
//! │  - QueryFn / PayloadFn / FileFn / PageFn                    │
//! │  - Settings snapshot, Authorization header                  │
//! │  - Retry, location-follow, pagination update, filtering     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │  RequestDescriptor
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Transport                                │
//! │  - One network attempt per send                             │
//! │  - ReqwestTransport: pooling, compression, upload progress  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use mendeley_client::{ClientContext, Endpoint, Pagination, RequestFactory, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mendeley_client::Error> {
//!     let context = ClientContext::new(Settings::from_env()?);
//!     let factory = RequestFactory::with_config(context, Default::default())?;
//!
//!     let pagination = Pagination::new();
//!     let search = factory.query(Endpoint::get("/catalog"), &pagination)?;
//!     let docs = search.call_with(&[], &[("doi", "10.1101/016295")]).await?;
//!
//!     println!("{docs}");
//!     Ok(())
//! }
//! ```

mod auth;
mod config;
mod context;
mod endpoint;
mod error;
mod factory;
mod headers;
mod pagination;
mod request;
mod response;
mod retry;
pub mod template;
mod transport;

pub use auth::{AuthFlow, AuthMode, NoAuth, StaticToken};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use context::{ClientContext, Settings, ACCESS_TOKEN_ENV, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use endpoint::Endpoint;
pub use error::{Error, ErrorKind, Result, GATEWAY_TIMEOUT};
pub use factory::{FileFn, PageFn, PayloadFn, PreparedCall, QueryFn, RequestFactory};
pub use headers::{
    encode_rfc5987, upload_headers, DeriveFn, HeaderRule, HeaderRules, Headers, LinkType,
    DEFAULT_UPLOAD_TYPE,
};
pub use pagination::{Pagination, PaginationLinks, PaginationState, Rel};
pub use request::{
    FileUpload, ProgressFn, RequestBody, RequestDescriptor, RequestMethod, UploadProgress,
};
pub use response::{
    parse_link_header, Body, Raw, Response, ResponseFilter, ResponseHeaders, COUNT_HEADER,
    LINK_HEADER, LOCATION_HEADER,
};
pub use retry::{BackoffStrategy, RetryConfig, RetryPolicy};
pub use transport::{ReqwestTransport, Transport, TransportSettings};

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("mendeley-sdk/", env!("CARGO_PKG_VERSION"));
