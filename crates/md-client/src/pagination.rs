//! Pagination cursor state for one resource collection.
//!
//! Every request function created for a collection shares one
//! [`Pagination`] handle. Responses update it in the order they arrive;
//! with overlapping calls the last response wins.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::response::ResponseHeaders;

/// A pagination relation that can be followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rel {
    Next,
    Previous,
    Last,
}

impl Rel {
    pub const ALL: [Rel; 3] = [Rel::Next, Rel::Previous, Rel::Last];

    /// Relation name as it appears in the `Link` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rel::Next => "next",
            Rel::Previous => "previous",
            Rel::Last => "last",
        }
    }
}

impl fmt::Display for Rel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cursor links. `None` means the server offered no such page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationLinks {
    pub next: Option<String>,
    pub previous: Option<String>,
    pub last: Option<String>,
}

impl PaginationLinks {
    pub fn get(&self, rel: Rel) -> Option<&str> {
        match rel {
            Rel::Next => self.next.as_deref(),
            Rel::Previous => self.previous.as_deref(),
            Rel::Last => self.last.as_deref(),
        }
    }

    fn slot(&mut self, rel: Rel) -> &mut Option<String> {
        match rel {
            Rel::Next => &mut self.next,
            Rel::Previous => &mut self.previous,
            Rel::Last => &mut self.last,
        }
    }
}

/// Cursor links plus the last known total count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    pub links: PaginationLinks,
    pub count: u64,
}

impl PaginationState {
    /// Apply the pagination headers of a completed response.
    ///
    /// A missing count header keeps the previous count. A missing `Link`
    /// header keeps all three links; a present one overwrites each link,
    /// clearing the relations it does not mention.
    pub fn update(&mut self, headers: &ResponseHeaders) {
        if let Some(count) = headers.count() {
            self.count = count;
        }

        let Some(relations) = headers.link_relations() else {
            return;
        };
        for rel in Rel::ALL {
            *self.links.slot(rel) = relations.get(rel.as_str()).cloned();
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Shared handle to a collection's [`PaginationState`].
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    state: Arc<Mutex<PaginationState>>,
}

impl Pagination {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut PaginationState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub fn update(&self, headers: &ResponseHeaders) {
        self.with_state(|state| state.update(headers));
    }

    /// Clear all links and zero the count.
    pub fn reset(&self) {
        self.with_state(PaginationState::reset);
    }

    /// Stored URL for `rel`, if any.
    pub fn link(&self, rel: Rel) -> Option<String> {
        self.with_state(|state| state.links.get(rel).map(str::to_string))
    }

    pub fn links(&self) -> PaginationLinks {
        self.with_state(|state| state.links.clone())
    }

    pub fn count(&self) -> u64 {
        self.with_state(|state| state.count)
    }

    pub fn snapshot(&self) -> PaginationState {
        self.with_state(|state| state.clone())
    }

    /// Overwrite the state, e.g. to resume from a saved cursor.
    pub fn restore(&self, saved: PaginationState) {
        self.with_state(|state| *state = saved);
    }

    /// Returns true if both handles point at the same state.
    pub fn shares_state_with(&self, other: &Pagination) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}
