//! Cursor navigation shared by every paginated resource.

use mendeley_client::{
    HeaderRules, PageFn, Pagination, PaginationLinks, PaginationState, Rel, RequestFactory,
};
use serde_json::Value;
use tracing::instrument;

use crate::error::Result;

/// `next`/`previous`/`last` followers bound to one collection's pagination.
#[derive(Debug, Clone)]
pub struct Pages {
    pagination: Pagination,
    next: PageFn,
    previous: PageFn,
    last: PageFn,
}

impl Pages {
    pub(crate) fn new(factory: &RequestFactory, headers: HeaderRules, pagination: &Pagination) -> Self {
        Self {
            pagination: pagination.clone(),
            next: factory.page(Rel::Next, headers.clone(), pagination),
            previous: factory.page(Rel::Previous, headers.clone(), pagination),
            last: factory.page(Rel::Last, headers, pagination),
        }
    }

    #[instrument(skip(self))]
    pub async fn next(&self) -> Result<Value> {
        Ok(self.next.call().await?)
    }

    #[instrument(skip(self))]
    pub async fn previous(&self) -> Result<Value> {
        Ok(self.previous.call().await?)
    }

    #[instrument(skip(self))]
    pub async fn last(&self) -> Result<Value> {
        Ok(self.last.call().await?)
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn links(&self) -> PaginationLinks {
        self.pagination.links()
    }

    /// Last known total count of the collection.
    pub fn count(&self) -> u64 {
        self.pagination.count()
    }

    pub fn state(&self) -> PaginationState {
        self.pagination.snapshot()
    }

    pub fn reset(&self) {
        self.pagination.reset();
    }
}

/// Expose the cursor of a resource that holds a `pages: Pages` field.
macro_rules! paginated {
    ($resource:ty) => {
        impl $resource {
            /// Fetch the page behind the stored `next` link.
            pub async fn next_page(&self) -> $crate::error::Result<serde_json::Value> {
                self.pages.next().await
            }

            pub async fn previous_page(&self) -> $crate::error::Result<serde_json::Value> {
                self.pages.previous().await
            }

            pub async fn last_page(&self) -> $crate::error::Result<serde_json::Value> {
                self.pages.last().await
            }

            pub fn pagination_links(&self) -> mendeley_client::PaginationLinks {
                self.pages.links()
            }

            /// Total count reported by the most recent listing.
            pub fn count(&self) -> u64 {
                self.pages.count()
            }

            pub fn reset_pagination(&self) {
                self.pages.reset();
            }

            pub fn pages(&self) -> &$crate::pages::Pages {
                &self.pages
            }
        }
    };
}

pub(crate) use paginated;

/// Reject ids that would collapse a path segment.
pub(crate) fn require_id<'a>(name: &str, id: &'a str) -> Result<&'a str> {
    if id.trim().is_empty() {
        return Err(crate::error::Error::invalid_argument(format!(
            "{name} must not be empty"
        )));
    }
    Ok(id)
}
