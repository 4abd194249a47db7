//! Layout parameters
//!
//! Parameters customize a reusable component: they are declared where the
//! component is linked, via the `param` operator, and consumed inside the
//! linked layout through `@param/name` references. The definition syntax is
//! similar to inline CSS style, a semicolon-separated list of colon-separated
//! pairs:
//!
//! ```text
//! <div data-compo="lib/list-view" data-param="caption:Users Info"></div>
//! ```

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::path::FilePath;

/// Mutable name/value map scoped to one template or widget invocation.
#[derive(Debug, Default)]
pub struct LayoutParameters {
    parameters: HashMap<String, String>,
}

impl LayoutParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload from a parameters definition. A `None` definition keeps the
    /// current map, so an invocation without parameters inherits the
    /// enclosing scope. Values are XML-escaped since they are substituted
    /// into layout text before parsing.
    pub fn reload(&mut self, definition: Option<&str>) {
        let Some(definition) = definition else {
            return;
        };
        self.parameters.clear();
        for pair in definition.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            if let Some((name, value)) = pair.split_once(':') {
                self.parameters
                    .insert(name.trim().to_string(), escape_xml(value.trim()));
            }
        }
    }

    /// Parameter value; unbound names are an error carrying the source file.
    pub fn value(&self, source: &FilePath, name: &str) -> Result<String> {
        self.parameters
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UndefinedParameter {
                path: source.value().to_string(),
                name: name.to_string(),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> FilePath {
        FilePath::parse("res/compo/list/list.htm", &[]).unwrap()
    }

    #[test]
    fn test_reload_and_value() {
        let mut parameters = LayoutParameters::new();
        parameters.reload(Some("caption:Users Info; title : Edit "));
        assert_eq!(parameters.value(&source(), "caption").unwrap(), "Users Info");
        assert_eq!(parameters.value(&source(), "title").unwrap(), "Edit");
    }

    #[test]
    fn test_undefined_parameter() {
        let mut parameters = LayoutParameters::new();
        parameters.reload(Some("caption:Info"));
        let result = parameters.value(&source(), "missing");
        assert!(matches!(result, Err(Error::UndefinedParameter { name, .. }) if name == "missing"));
    }

    #[test]
    fn test_reload_none_keeps_scope() {
        let mut parameters = LayoutParameters::new();
        parameters.reload(Some("caption:Info"));
        parameters.reload(None);
        assert_eq!(parameters.value(&source(), "caption").unwrap(), "Info");
    }

    #[test]
    fn test_reload_replaces_scope() {
        let mut parameters = LayoutParameters::new();
        parameters.reload(Some("caption:Info"));
        parameters.reload(Some("title:Other"));
        assert!(parameters.value(&source(), "caption").is_err());
    }

    #[test]
    fn test_values_escaped() {
        let mut parameters = LayoutParameters::new();
        parameters.reload(Some("caption:a < b & c"));
        assert_eq!(
            parameters.value(&source(), "caption").unwrap(),
            "a &lt; b &amp; c"
        );
    }
}
