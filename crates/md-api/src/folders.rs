//! Folders in the user's library.

use mendeley_client::{Endpoint, HeaderRules, Pagination, PayloadFn, QueryFn, RequestFactory};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::Result;
use crate::pages::{paginated, require_id, Pages};

/// Media type of folder payloads.
pub const FOLDER_TYPE: &str = "application/vnd.mendeley-folder.1+json";

#[derive(Debug, Clone)]
pub struct Folders {
    create: PayloadFn,
    retrieve: QueryFn,
    update: PayloadFn,
    delete: QueryFn,
    list: QueryFn,
    pages: Pages,
}

impl Folders {
    pub fn new(factory: &RequestFactory) -> Result<Self> {
        let pagination = Pagination::new();
        Ok(Self {
            create: factory.payload(
                Endpoint::post("/folders")
                    .header("Content-Type", FOLDER_TYPE)
                    .follow_location(),
                &pagination,
            )?,
            retrieve: factory.query(Endpoint::get("/folders/{id}").vars(&["id"]), &pagination)?,
            update: factory.payload(
                Endpoint::patch("/folders/{id}")
                    .vars(&["id"])
                    .header("Content-Type", FOLDER_TYPE),
                &pagination,
            )?,
            delete: factory.query(Endpoint::delete("/folders/{id}").vars(&["id"]), &pagination)?,
            list: factory.query(Endpoint::get("/folders"), &pagination)?,
            pages: Pages::new(factory, HeaderRules::new(), &pagination),
        })
    }

    /// Create a folder and return it as stored by the server.
    #[instrument(skip(self, folder))]
    pub async fn create<B: Serialize + ?Sized>(&self, folder: &B) -> Result<Value> {
        Ok(self.create.call(&[], folder).await?)
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, id: &str) -> Result<Value> {
        let id = require_id("folder id", id)?;
        Ok(self.retrieve.call(&[id]).await?)
    }

    #[instrument(skip(self, patch))]
    pub async fn update<B: Serialize + ?Sized>(&self, id: &str, patch: &B) -> Result<Value> {
        let id = require_id("folder id", id)?;
        Ok(self.update.call(&[id], patch).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Value> {
        let id = require_id("folder id", id)?;
        Ok(self.delete.call(&[id]).await?)
    }

    #[instrument(skip(self, params))]
    pub async fn list<Q: Serialize + ?Sized>(&self, params: &Q) -> Result<Value> {
        Ok(self.list.call_with(&[], params).await?)
    }
}

paginated!(Folders);
