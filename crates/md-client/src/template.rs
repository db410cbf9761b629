//! URI template expansion for `{name}` placeholders.
//!
//! Values are substituted verbatim. Callers pass path segments that are
//! already URL-safe.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::{Error, ErrorKind, Result};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z]+)\}").expect("placeholder pattern is valid"));

/// Names of every placeholder in `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Expand `template`, binding `names[i]` to `values[i]`.
///
/// With no names the template is returned unchanged. Extra values are
/// ignored; a placeholder whose name has no value fails with
/// [`ErrorKind::MissingTemplateVariable`].
pub fn expand(template: &str, names: &[&str], values: &[&str]) -> Result<String> {
    if names.is_empty() {
        return Ok(template.to_string());
    }

    let bindings: HashMap<&str, &str> = names
        .iter()
        .copied()
        .zip(values.iter().copied())
        .collect();

    let mut expanded = String::with_capacity(template.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = bindings.get(name.as_str()).ok_or_else(|| {
            Error::new(ErrorKind::MissingTemplateVariable(name.as_str().to_string()))
        })?;
        expanded.push_str(&template[last..whole.start()]);
        expanded.push_str(value);
        last = whole.end();
    }
    expanded.push_str(&template[last..]);

    Ok(expanded)
}
