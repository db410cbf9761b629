//! Static endpoint descriptors.

use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};
use crate::headers::{HeaderRules, LinkType};
use crate::request::RequestMethod;
use crate::template;

/// Declaration of one API operation: method, URI template, the order in
/// which path variables are passed, and header rules.
///
/// # Example
///
/// ```rust
/// use mendeley_client::Endpoint;
///
/// let update = Endpoint::patch("/documents/{id}")
///     .vars(&["id"])
///     .header("Content-Type", "application/vnd.mendeley-document.1+json");
/// assert!(update.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Endpoint {
    method: RequestMethod,
    uri_template: String,
    uri_vars: Vec<String>,
    headers: HeaderRules,
    follow_location: bool,
    link_type: Option<LinkType>,
}

impl Endpoint {
    pub fn new(method: RequestMethod, uri_template: impl Into<String>) -> Self {
        Self {
            method,
            uri_template: uri_template.into(),
            uri_vars: Vec::new(),
            headers: HeaderRules::new(),
            follow_location: false,
            link_type: None,
        }
    }

    pub fn get(uri_template: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, uri_template)
    }

    pub fn post(uri_template: impl Into<String>) -> Self {
        Self::new(RequestMethod::Post, uri_template)
    }

    pub fn patch(uri_template: impl Into<String>) -> Self {
        Self::new(RequestMethod::Patch, uri_template)
    }

    pub fn put(uri_template: impl Into<String>) -> Self {
        Self::new(RequestMethod::Put, uri_template)
    }

    pub fn delete(uri_template: impl Into<String>) -> Self {
        Self::new(RequestMethod::Delete, uri_template)
    }

    /// Declare the path variables, in the order calls pass their values.
    pub fn vars(mut self, names: &[&str]) -> Self {
        self.uri_vars = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Add a header with a fixed value.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers = self.headers.literal(name, value);
        self
    }

    /// Add a header computed from the payload at call time.
    pub fn derived_header<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Option<&Value>) -> String + Send + Sync + 'static,
    {
        self.headers = self.headers.derived(name, f);
        self
    }

    pub fn headers(mut self, headers: HeaderRules) -> Self {
        self.headers = headers;
        self
    }

    /// After a successful response with a `Location` header, GET that
    /// location and resolve with the second response.
    pub fn follow_location(mut self) -> Self {
        self.follow_location = true;
        self
    }

    /// Link uploads to a parent resource (`group` or `document`).
    ///
    /// Unknown names leave the endpoint without a link type.
    pub fn link_type(mut self, name: &str) -> Self {
        self.link_type = LinkType::parse(name);
        self
    }

    /// Check that every placeholder in the template is a declared variable.
    pub fn validate(&self) -> Result<()> {
        for name in template::placeholders(&self.uri_template) {
            if !self.uri_vars.iter().any(|v| v == name) {
                return Err(Error::new(ErrorKind::MalformedEndpoint {
                    template: self.uri_template.clone(),
                    variable: name.to_string(),
                }));
            }
        }
        Ok(())
    }

    /// Expand the template with positional `values`.
    pub fn path(&self, values: &[&str]) -> Result<String> {
        let names: Vec<&str> = self.uri_vars.iter().map(String::as_str).collect();
        template::expand(&self.uri_template, &names, values)
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn uri_template(&self) -> &str {
        &self.uri_template
    }

    pub fn uri_vars(&self) -> &[String] {
        &self.uri_vars
    }

    pub fn header_rules(&self) -> &HeaderRules {
        &self.headers
    }

    pub fn follows_location(&self) -> bool {
        self.follow_location
    }

    pub fn upload_link_type(&self) -> Option<LinkType> {
        self.link_type
    }
}
