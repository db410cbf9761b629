//! Catalog search and retrieval.

use mendeley_client::{Endpoint, HeaderRules, Pagination, QueryFn, RequestFactory};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::Result;
use crate::pages::{paginated, require_id, Pages};

/// The public catalog of documents.
#[derive(Debug, Clone)]
pub struct Catalog {
    search: QueryFn,
    retrieve: QueryFn,
    pages: Pages,
}

impl Catalog {
    pub fn new(factory: &RequestFactory) -> Result<Self> {
        let pagination = Pagination::new();
        Ok(Self {
            search: factory.query(Endpoint::get("/catalog"), &pagination)?,
            retrieve: factory.query(Endpoint::get("/catalog/{id}").vars(&["id"]), &pagination)?,
            pages: Pages::new(factory, HeaderRules::new(), &pagination),
        })
    }

    /// Search the catalog, e.g. by `doi`, `pmid` or `filehash`.
    #[instrument(skip(self, params))]
    pub async fn search<Q: Serialize + ?Sized>(&self, params: &Q) -> Result<Value> {
        Ok(self.search.call_with(&[], params).await?)
    }

    /// Retrieve one catalog document. `params` may select a `view`.
    #[instrument(skip(self, params))]
    pub async fn retrieve<Q: Serialize + ?Sized>(&self, id: &str, params: &Q) -> Result<Value> {
        let id = require_id("catalog id", id)?;
        Ok(self.retrieve.call_with(&[id], params).await?)
    }
}

paginated!(Catalog);
