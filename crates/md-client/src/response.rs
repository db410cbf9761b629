//! Response envelope, the headers this layer interprets, and response filters.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};

/// Header carrying the total number of items in a collection.
pub const COUNT_HEADER: &str = "mendeley-count";

/// Header carrying pagination link relations.
pub const LINK_HEADER: &str = "link";

/// Header naming a newly created resource.
pub const LOCATION_HEADER: &str = "location";

/// Response headers, keyed by lowercase name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders(HashMap<String, String>);

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Add a field line. Repeated names are joined with `", "`.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        self.0
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    /// Get a header value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&name.to_ascii_lowercase())
    }

    pub fn location(&self) -> Option<&str> {
        self.get(LOCATION_HEADER).filter(|l| !l.is_empty())
    }

    /// Total count announced by the server. Unparseable values count as absent.
    pub fn count(&self) -> Option<u64> {
        self.get(COUNT_HEADER)?.trim().parse().ok()
    }

    /// The `Link` header as a relation -> URL mapping.
    ///
    /// None when the header is absent; an empty map when it carries no
    /// usable relations.
    pub fn link_relations(&self) -> Option<HashMap<String, String>> {
        self.get(LINK_HEADER).map(parse_link_header)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = ResponseHeaders::new();
        for (k, v) in iter {
            headers.append(k.as_ref(), v);
        }
        headers
    }
}

/// Parse an RFC 8288 `Link` header into relation -> URL.
///
/// Format: `<https://api.mendeley.com/documents?marker=..>; rel="next", ...`.
/// A link with several space-separated relations is recorded under each.
/// The first link for a relation wins.
pub fn parse_link_header(header: &str) -> HashMap<String, String> {
    let mut links = HashMap::new();

    for part in split_links(header) {
        let Some(rest) = part.strip_prefix('<') else {
            continue;
        };
        let Some((url, params)) = rest.split_once('>') else {
            continue;
        };

        let mut rels: Vec<&str> = Vec::new();
        for segment in params.split(';') {
            if let Some((key, value)) = segment.split_once('=') {
                if key.trim().eq_ignore_ascii_case("rel") {
                    let value = value.trim().trim_matches('"').trim_matches('\'');
                    rels.extend(value.split_whitespace());
                }
            }
        }

        for rel in rels {
            links
                .entry(rel.to_string())
                .or_insert_with(|| url.to_string());
        }
    }

    links
}

/// Split on commas that separate links, not commas inside `<...>`.
fn split_links(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in header.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(header[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(header[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: ResponseHeaders,
    /// Decoded body: JSON when the server sent JSON, `null` when empty,
    /// otherwise the raw text as a JSON string.
    pub body: Value,
}

impl Response {
    pub fn new(status: u16, headers: ResponseHeaders, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.body.clone()).map_err(Into::into)
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}

/// Decode a response body. Empty bodies become `null`; bodies that are not
/// JSON are kept as a string.
pub fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Build the error for a non-2xx response.
pub fn error_from_status(status: u16, reason: Option<&str>, body: Value) -> Error {
    let message = match &body {
        Value::Null => reason.unwrap_or_default().to_string(),
        Value::String(text) => sanitize_error_message(text),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(sanitize_error_message)
            .unwrap_or_else(|| reason.unwrap_or_default().to_string()),
        other => sanitize_error_message(&other.to_string()),
    };

    Error::new(ErrorKind::Http {
        status,
        message,
        body: (!body.is_null()).then_some(body),
    })
}

static BEARER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)bearer\s+[A-Za-z0-9\-._~+/]+=*").expect("bearer pattern is valid")
});

static ACCESS_TOKEN_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(access_token|refresh_token)=[^&\s]+").expect("token param pattern is valid")
});

/// Sanitize an error message before it is surfaced.
///
/// Redacts bearer tokens and token query parameters and truncates
/// messages longer than 500 characters.
pub(crate) fn sanitize_error_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let sanitized = BEARER_TOKEN.replace_all(message, "Bearer [REDACTED]");
    let mut sanitized = ACCESS_TOKEN_PARAM
        .replace_all(&sanitized, "$1=[REDACTED]")
        .to_string();

    if sanitized.len() > MAX_LENGTH {
        let mut cut = MAX_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}

/// Decides what a request function resolves with.
pub trait ResponseFilter: Send + Sync + 'static {
    type Output: Send;

    fn apply(response: Response) -> Result<Self::Output>;
}

/// Resolve with the parsed body only. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Body;

impl ResponseFilter for Body {
    type Output = Value;

    fn apply(response: Response) -> Result<Value> {
        Ok(response.body)
    }
}

/// Resolve with the full response: status, headers and body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Raw;

impl ResponseFilter for Raw {
    type Output = Response;

    fn apply(response: Response) -> Result<Response> {
        Ok(response)
    }
}
