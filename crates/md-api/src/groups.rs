//! Groups the user belongs to.

use mendeley_client::{Endpoint, HeaderRules, Pagination, QueryFn, RequestFactory};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::Result;
use crate::pages::{paginated, require_id, Pages};

#[derive(Debug, Clone)]
pub struct Groups {
    list: QueryFn,
    retrieve: QueryFn,
    pages: Pages,
}

impl Groups {
    pub fn new(factory: &RequestFactory) -> Result<Self> {
        let pagination = Pagination::new();
        Ok(Self {
            list: factory.query(Endpoint::get("/groups"), &pagination)?,
            retrieve: factory.query(Endpoint::get("/groups/{id}").vars(&["id"]), &pagination)?,
            pages: Pages::new(factory, HeaderRules::new(), &pagination),
        })
    }

    #[instrument(skip(self, params))]
    pub async fn list<Q: Serialize + ?Sized>(&self, params: &Q) -> Result<Value> {
        Ok(self.list.call_with(&[], params).await?)
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, id: &str) -> Result<Value> {
        let id = require_id("group id", id)?;
        Ok(self.retrieve.call(&[id]).await?)
    }
}

paginated!(Groups);
