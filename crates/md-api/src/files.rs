//! File attachments.

use mendeley_client::{
    Endpoint, FileFn, FileUpload, HeaderRules, Pagination, ProgressFn, QueryFn, RequestFactory,
};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::Result;
use crate::pages::{paginated, require_id, Pages};

#[derive(Debug, Clone)]
pub struct Files {
    create: FileFn,
    list: QueryFn,
    delete: QueryFn,
    pages: Pages,
}

impl Files {
    pub fn new(factory: &RequestFactory) -> Result<Self> {
        let pagination = Pagination::new();
        Ok(Self {
            create: factory.file(Endpoint::post("/files").link_type("document"), &pagination)?,
            list: factory.query(Endpoint::get("/files"), &pagination)?,
            delete: factory.query(Endpoint::delete("/files/{id}").vars(&["id"]), &pagination)?,
            pages: Pages::new(factory, HeaderRules::new(), &pagination),
        })
    }

    /// Attach `file` to the document `document_id`.
    #[instrument(skip(self, file, progress), fields(file = %file.name))]
    pub async fn create(
        &self,
        file: &FileUpload,
        document_id: &str,
        progress: Option<ProgressFn>,
    ) -> Result<Value> {
        let document_id = require_id("document id", document_id)?;
        Ok(self.create.call(file, Some(document_id), progress).await?)
    }

    /// List files, optionally filtered by `document_id` or `group_id`.
    #[instrument(skip(self, params))]
    pub async fn list<Q: Serialize + ?Sized>(&self, params: &Q) -> Result<Value> {
        Ok(self.list.call_with(&[], params).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Value> {
        let id = require_id("file id", id)?;
        Ok(self.delete.call(&[id]).await?)
    }
}

paginated!(Files);
