//! Header composition: static rules, payload-derived values and the
//! headers an upload needs.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::request::FileUpload;

/// Content type used when an upload does not declare one.
pub const DEFAULT_UPLOAD_TYPE: &str = "application/octet-stream";

/// A resolved header map. Names compare case-insensitively.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any existing one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.0.insert(name, value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let key = self
            .0
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()?;
        self.0.remove(&key)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Overlay `other` on top of `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: Headers) {
        for (name, value) in other.0 {
            self.insert(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(k, v)| {
                if k.eq_ignore_ascii_case("authorization") {
                    (k.as_str(), "[REDACTED]")
                } else {
                    (k.as_str(), v.as_str())
                }
            }))
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

/// Function computing a header value from the call's payload.
pub type DeriveFn = Arc<dyn Fn(Option<&Value>) -> String + Send + Sync>;

/// How a header's value is obtained.
#[derive(Clone)]
pub enum HeaderRule {
    Literal(String),
    Derived(DeriveFn),
}

impl fmt::Debug for HeaderRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderRule::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            HeaderRule::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// The header rules of an endpoint, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct HeaderRules(Vec<(String, HeaderRule)>);

impl HeaderRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn literal(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((name.into(), HeaderRule::Literal(value.into())));
        self
    }

    pub fn derived<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Option<&Value>) -> String + Send + Sync + 'static,
    {
        self.0.push((name.into(), HeaderRule::Derived(Arc::new(f))));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve every rule against `payload`.
    pub fn compose(&self, payload: Option<&Value>) -> Headers {
        self.0
            .iter()
            .map(|(name, rule)| {
                let value = match rule {
                    HeaderRule::Literal(value) => value.clone(),
                    HeaderRule::Derived(derive) => derive(payload),
                };
                (name.clone(), value)
            })
            .collect()
    }
}

/// Parent resource an uploaded file can be linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    Group,
    Document,
}

impl LinkType {
    /// Parse a link type name. Unknown names yield None.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "group" => Some(LinkType::Group),
            "document" => Some(LinkType::Document),
            _ => None,
        }
    }

    pub fn rel(&self) -> &'static str {
        match self {
            LinkType::Group => "group",
            LinkType::Document => "document",
        }
    }

    fn collection(&self) -> &'static str {
        match self {
            LinkType::Group => "groups",
            LinkType::Document => "documents",
        }
    }
}

/// Percent-encode a value for an RFC 5987 `filename*` parameter.
///
/// Only ASCII letters, digits and `-_.!~` survive unescaped.
pub fn encode_rfc5987(value: &str) -> String {
    urlencoding::encode(value).replace("%21", "!")
}

/// Headers describing an upload: content type, disposition and an optional
/// `Link` to the parent resource.
pub fn upload_headers(
    file: &FileUpload,
    link: Option<(LinkType, &str)>,
    base_url: &str,
) -> Headers {
    let mut headers = Headers::new();
    headers.insert(
        "Content-Type",
        file.content_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_TYPE),
    );
    headers.insert(
        "Content-Disposition",
        format!("attachment; filename*=UTF-8''{}", encode_rfc5987(&file.name)),
    );

    if let Some((link_type, id)) = link.filter(|(_, id)| !id.is_empty()) {
        headers.insert(
            "Link",
            format!(
                "<{}/{}/{}>; rel=\"{}\"",
                base_url,
                link_type.collection(),
                id,
                link_type.rel()
            ),
        );
    }

    headers
}
