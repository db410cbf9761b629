//! Documents in the user's library.

use mendeley_client::{
    Endpoint, FileFn, FileUpload, HeaderRules, Pagination, PayloadFn, ProgressFn, QueryFn,
    RequestFactory,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::pages::{paginated, require_id, Pages};

/// Media type of document payloads.
pub const DOCUMENT_TYPE: &str = "application/vnd.mendeley-document.1+json";

/// Media type of a clone request.
pub const DOCUMENT_CLONE_TYPE: &str = "application/vnd.mendeley-document-clone.1+json";

/// List parameter that routes the listing through a folder.
const FOLDER_PARAM: &str = "folderId";

/// The only list parameter the folder listing accepts.
const LIMIT_PARAM: &str = "limit";

#[derive(Debug, Clone)]
pub struct Documents {
    create: PayloadFn,
    create_from_file: FileFn,
    create_from_file_in_group: FileFn,
    retrieve: QueryFn,
    update: PayloadFn,
    clone_to: PayloadFn,
    list: QueryFn,
    list_in_folder: QueryFn,
    trash: PayloadFn,
    pages: Pages,
}

impl Documents {
    pub fn new(factory: &RequestFactory) -> Result<Self> {
        let pagination = Pagination::new();
        let document_headers = HeaderRules::new().literal("Content-Type", DOCUMENT_TYPE);

        Ok(Self {
            create: factory.payload(
                Endpoint::post("/documents")
                    .headers(document_headers.clone())
                    .follow_location(),
                &pagination,
            )?,
            create_from_file: factory.file(Endpoint::post("/documents"), &pagination)?,
            create_from_file_in_group: factory.file(
                Endpoint::post("/documents").link_type("group"),
                &pagination,
            )?,
            retrieve: factory.query(Endpoint::get("/documents/{id}").vars(&["id"]), &pagination)?,
            update: factory.payload(
                Endpoint::patch("/documents/{id}")
                    .vars(&["id"])
                    .headers(document_headers.clone()),
                &pagination,
            )?,
            clone_to: factory.payload(
                Endpoint::post("/documents/{id}/actions/cloneTo")
                    .vars(&["id"])
                    .header("Content-Type", DOCUMENT_CLONE_TYPE),
                &pagination,
            )?,
            list: factory.query(Endpoint::get("/documents/"), &pagination)?,
            list_in_folder: factory.query(
                Endpoint::get("/folders/{id}/documents").vars(&["id"]),
                &pagination,
            )?,
            trash: factory.payload(
                Endpoint::post("/documents/{id}/trash")
                    .vars(&["id"])
                    .headers(document_headers),
                &pagination,
            )?,
            pages: Pages::new(factory, HeaderRules::new(), &pagination),
        })
    }

    /// Create a document and return it as stored by the server.
    #[instrument(skip(self, document))]
    pub async fn create<B: Serialize + ?Sized>(&self, document: &B) -> Result<Value> {
        Ok(self.create.call(&[], document).await?)
    }

    /// Create a document by uploading a file; metadata is extracted server-side.
    #[instrument(skip(self, file, progress), fields(file = %file.name))]
    pub async fn create_from_file(
        &self,
        file: &FileUpload,
        progress: Option<ProgressFn>,
    ) -> Result<Value> {
        Ok(self.create_from_file.call(file, None, progress).await?)
    }

    /// Like [`create_from_file`](Self::create_from_file), inside a group.
    #[instrument(skip(self, file, progress), fields(file = %file.name))]
    pub async fn create_from_file_in_group(
        &self,
        file: &FileUpload,
        group_id: &str,
        progress: Option<ProgressFn>,
    ) -> Result<Value> {
        let group_id = require_id("group id", group_id)?;
        Ok(self
            .create_from_file_in_group
            .call(file, Some(group_id), progress)
            .await?)
    }

    #[instrument(skip(self, params))]
    pub async fn retrieve<Q: Serialize + ?Sized>(&self, id: &str, params: &Q) -> Result<Value> {
        let id = require_id("document id", id)?;
        Ok(self.retrieve.call_with(&[id], params).await?)
    }

    #[instrument(skip(self, patch))]
    pub async fn update<B: Serialize + ?Sized>(&self, id: &str, patch: &B) -> Result<Value> {
        let id = require_id("document id", id)?;
        Ok(self.update.call(&[id], patch).await?)
    }

    /// Copy a document into another library, e.g. `{"group_id": "..."}`.
    #[instrument(skip(self, target))]
    pub async fn clone_to<B: Serialize + ?Sized>(&self, id: &str, target: &B) -> Result<Value> {
        let id = require_id("document id", id)?;
        Ok(self.clone_to.call(&[id], target).await?)
    }

    /// List documents.
    ///
    /// When `params` carries `folderId` the folder's documents are listed
    /// instead, and every parameter except `limit` is dropped.
    #[instrument(skip(self, params))]
    pub async fn list<Q: Serialize + ?Sized>(&self, params: &Q) -> Result<Value> {
        let params = match serde_json::to_value(params)? {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(Error::invalid_argument(format!(
                    "list parameters must be an object, got {other}"
                )))
            }
        };

        let Some(folder) = params.get(FOLDER_PARAM) else {
            return Ok(self.list.call_with(&[], &params).await?);
        };
        let folder = folder
            .as_str()
            .ok_or_else(|| Error::invalid_argument("folderId must be a string"))?;
        let folder = require_id(FOLDER_PARAM, folder)?;

        let kept: Map<String, Value> = params
            .iter()
            .filter(|(name, _)| name.as_str() == LIMIT_PARAM)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        debug!(folder, "Listing documents through folder");
        Ok(self.list_in_folder.call_with(&[folder], &kept).await?)
    }

    /// Move a document to the trash.
    #[instrument(skip(self))]
    pub async fn trash(&self, id: &str) -> Result<Value> {
        let id = require_id("document id", id)?;
        Ok(self.trash.call_empty(&[id]).await?)
    }
}

paginated!(Documents);
