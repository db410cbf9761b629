//! # mendeley-api
//!
//! Mendeley API resources built on `mendeley-client` request functions.
//!
//! ## Features
//!
//! - **Catalog** - Search and retrieve catalog documents
//! - **Documents** - Create (from metadata or a file), retrieve, update,
//!   clone, list (per folder too) and trash library documents
//! - **Files** - Upload attachments with progress reporting, list, delete
//! - **Folders** - Full CRUD and listing
//! - **Groups** - List and retrieve groups
//! - **Pagination** - `next_page`/`previous_page`/`last_page` and the total
//!   count on every collection
//!
//! ## Example
//!
//! ```rust,ignore
//! use mendeley_api::MendeleyApi;
//! use mendeley_client::FileUpload;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mendeley_api::Error> {
//!     let api = MendeleyApi::from_env()?;
//!
//!     // Catalog lookup
//!     let found = api
//!         .catalog
//!         .search(&[("doi", "10.1103/PhysRevA.20.1521")])
//!         .await?;
//!
//!     // Create and fetch the stored document
//!     let doc = api
//!         .documents
//!         .create(&serde_json::json!({"title": "foo", "type": "journal"}))
//!         .await?;
//!
//!     // Attach a file to it
//!     let pdf = FileUpload::new("paper.pdf", std::fs::read("paper.pdf").unwrap())
//!         .with_content_type("application/pdf");
//!     api.files.create(&pdf, doc["id"].as_str().unwrap(), None).await?;
//!
//!     Ok(())
//! }
//! ```

mod catalog;
mod client;
mod documents;
mod error;
mod files;
mod folders;
mod groups;
mod pages;

pub use catalog::Catalog;
pub use client::MendeleyApi;
pub use documents::{Documents, DOCUMENT_CLONE_TYPE, DOCUMENT_TYPE};
pub use error::{Error, ErrorKind, Result};
pub use files::Files;
pub use folders::{Folders, FOLDER_TYPE};
pub use groups::Groups;
pub use pages::Pages;
