//! At-meta references
//!
//! A reference is a typed placeholder token in source text, resolved at build
//! time to a variable value or a resource path:
//!
//! ```text
//! reference = "@" type "/" ?(path "/") name
//! path      = 1*CH           ; optional sub-path, resource files only
//! name      = 1*CH           ; reference name, unique in scope
//! CH        = ALPHA / DIGIT / "-"
//! ```
//!
//! Sample usage, note that references are plain text replacements:
//!
//! ```text
//! <h1>@string/title</h1>
//! <img src="@image/logo" />
//! background-image: url("@image/page-bg");
//! ```

use std::fmt;

use crate::error::{Error, Result};

/// Reference mark character.
pub const MARK: char = '@';

/// Reference type and sub-path separator.
pub const SEPARATOR: char = '/';

/// Reference type token. There are three families: variables (text replaced
/// with their values), resource files (replaced with URL paths) and layout
/// parameters (replaced from the invocation scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceType {
    // variables
    /// Plain string value, mainly for multi-locale support.
    String,
    /// Same as `String` but the value is an HTML fragment.
    Text,
    /// Link to a local or third-party resource, mainly for `href`.
    Link,
    /// Tool-tip value, usually for `title` attributes.
    Tip,

    // descriptors
    Project,

    // resource files
    Image,
    Audio,
    Video,
    /// Font family file declared by a `@font-face` rule.
    Font,
    /// Generic file, for example a license text.
    File,

    /// Layout parameter declared by a child component, valued by its parent.
    Param,

    // site files
    Layout,
    Style,

    /// Anything else; the reference reaches the handler which decides.
    Unknown,
}

impl ReferenceType {
    /// Parse a type token, not case-sensitive. Unrecognized tokens map to
    /// `Unknown` rather than failing; validity is the handler's concern.
    pub fn from_token(token: &str) -> ReferenceType {
        match token.to_ascii_lowercase().as_str() {
            "string" => ReferenceType::String,
            "text" => ReferenceType::Text,
            "link" => ReferenceType::Link,
            "tip" => ReferenceType::Tip,
            "project" => ReferenceType::Project,
            "image" => ReferenceType::Image,
            "audio" => ReferenceType::Audio,
            "video" => ReferenceType::Video,
            "font" => ReferenceType::Font,
            "file" => ReferenceType::File,
            "param" => ReferenceType::Param,
            "layout" => ReferenceType::Layout,
            "style" => ReferenceType::Style,
            _ => ReferenceType::Unknown,
        }
    }

    /// Variable type token as it appears in source text and as variables file
    /// root element name; `None` for non-variable types.
    pub fn variable_token(&self) -> Option<&'static str> {
        match self {
            ReferenceType::String => Some("string"),
            ReferenceType::Text => Some("text"),
            ReferenceType::Link => Some("link"),
            ReferenceType::Tip => Some("tip"),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        self.variable_token().is_some()
    }

    pub fn is_media_file(&self) -> bool {
        matches!(
            self,
            ReferenceType::Image | ReferenceType::Audio | ReferenceType::Video
        )
    }

    fn token(&self) -> &'static str {
        match self {
            ReferenceType::String => "string",
            ReferenceType::Text => "text",
            ReferenceType::Link => "link",
            ReferenceType::Tip => "tip",
            ReferenceType::Project => "project",
            ReferenceType::Image => "image",
            ReferenceType::Audio => "audio",
            ReferenceType::Video => "video",
            ReferenceType::Font => "font",
            ReferenceType::File => "file",
            ReferenceType::Param => "param",
            ReferenceType::Layout => "layout",
            ReferenceType::Style => "style",
            ReferenceType::Unknown => "unknown",
        }
    }
}

/// Immutable at-meta reference: type, optional sub-path and name. The
/// sub-path addresses resource files in sub-directories, e.g.
/// `@image/icon/logo`; variable references may not carry one. Equality is by
/// (type, path, name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    reference_type: ReferenceType,
    path: Option<String>,
    name: String,
}

impl Reference {
    /// Create a reference for a given type and name; the name may embed a
    /// sub-path for resource file types. `source` is used for error reporting
    /// only. Errors on variable references carrying a sub-path.
    pub fn new(source: &str, reference_type: ReferenceType, name: &str) -> Result<Reference> {
        match name.rsplit_once(SEPARATOR) {
            None => Ok(Reference {
                reference_type,
                path: None,
                name: name.to_string(),
            }),
            Some((path, base)) => {
                if reference_type.is_variable() {
                    return Err(Error::InvalidReference {
                        path: source.to_string(),
                        text: format!("@{}/{}", reference_type.token(), name),
                    });
                }
                Ok(Reference {
                    reference_type,
                    path: Some(path.to_string()),
                    name: base.to_string(),
                })
            }
        }
    }

    /// Parse reference text. Returns `Ok(None)` when the text is not a
    /// reference at all - no leading mark, no separator-terminated type token
    /// or empty name - which callers treat as pass-through text. Unrecognized
    /// type tokens parse as `ReferenceType::Unknown`.
    pub fn parse(text: &str) -> Result<Option<Reference>> {
        let Some(body) = text.strip_prefix(MARK) else {
            return Ok(None);
        };
        let Some((token, name)) = body.split_once(SEPARATOR) else {
            return Ok(None);
        };
        if token.is_empty() || name.is_empty() || name.ends_with(SEPARATOR) {
            return Ok(None);
        }
        Ok(Some(Reference::new(
            text,
            ReferenceType::from_token(token),
            name,
        )?))
    }

    pub fn reference_type(&self) -> ReferenceType {
        self.reference_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_path(&self) -> bool {
        self.path.is_some()
    }

    /// Sub-path for resource files stored in sub-directories, possibly `None`.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_variable(&self) -> bool {
        self.reference_type.is_variable()
    }

    pub fn is_media_file(&self) -> bool {
        self.reference_type.is_media_file()
    }

    /// Character class accepted inside reference names: US-ASCII alphanumeric
    /// and dash.
    pub fn is_name_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '-'
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", MARK, self.reference_type.token(), SEPARATOR)?;
        if let Some(path) = &self.path {
            write!(f, "{}{}", path, SEPARATOR)?;
        }
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variable_reference() {
        let reference = Reference::parse("@string/title").unwrap().unwrap();
        assert_eq!(reference.reference_type(), ReferenceType::String);
        assert_eq!(reference.name(), "title");
        assert!(!reference.has_path());
        assert!(reference.is_variable());
    }

    #[test]
    fn test_parse_resource_with_path() {
        let reference = Reference::parse("@image/icon/logo").unwrap().unwrap();
        assert_eq!(reference.reference_type(), ReferenceType::Image);
        assert_eq!(reference.path(), Some("icon"));
        assert_eq!(reference.name(), "logo");
        assert!(reference.is_media_file());
    }

    #[test]
    fn test_parse_case_insensitive_type() {
        let reference = Reference::parse("@STRING/title").unwrap().unwrap();
        assert_eq!(reference.reference_type(), ReferenceType::String);
    }

    #[test]
    fn test_parse_unknown_type() {
        let reference = Reference::parse("@bogus/name").unwrap().unwrap();
        assert_eq!(reference.reference_type(), ReferenceType::Unknown);
    }

    #[test]
    fn test_parse_not_a_reference() {
        assert!(Reference::parse("string/title").unwrap().is_none());
        assert!(Reference::parse("@media").unwrap().is_none());
        assert!(Reference::parse("@string/").unwrap().is_none());
        assert!(Reference::parse("@/name").unwrap().is_none());
    }

    #[test]
    fn test_variable_with_path_rejected() {
        let result = Reference::parse("@string/menu/title");
        assert!(matches!(result, Err(Error::InvalidReference { .. })));
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["@string/title", "@image/icon/logo", "@param/caption"] {
            let reference = Reference::parse(text).unwrap().unwrap();
            assert_eq!(reference.to_string(), text);
        }
    }

    #[test]
    fn test_equality() {
        let a = Reference::parse("@string/title").unwrap().unwrap();
        let b = Reference::parse("@string/title").unwrap().unwrap();
        let c = Reference::parse("@text/title").unwrap().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
