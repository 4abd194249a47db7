//! File path variants: locale qualifiers and media-query aliases
//!
//! Variants qualify a file path so a project can keep groups of files with the
//! same semantic content but different presentation, e.g. `strings_ro.xml` for
//! Romanian variables or `page_w1200.css` for a narrow-screen style. Variants
//! are appended to the file base name, each preceded by an underscore.

use crate::error::{Error, Result};

/// Media query definition from the project descriptor. The alias stands in for
/// the media query as a file path variant; the expression is emitted literally
/// inside the generated `@media` rule; the weight drives canonical ordering of
/// media sections, which is the caller's concern.
///
/// The alias is the definition's identity: two definitions are equal when
/// their aliases are equal.
#[derive(Debug, Clone)]
pub struct MediaQueryDefinition {
    pub alias: String,
    pub expression: String,
    pub weight: i32,
}

impl MediaQueryDefinition {
    pub fn new(alias: impl Into<String>, expression: impl Into<String>, weight: i32) -> Self {
        Self {
            alias: alias.into(),
            expression: expression.into(),
            weight,
        }
    }
}

impl PartialEq for MediaQueryDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.alias == other.alias
    }
}

impl Eq for MediaQueryDefinition {}

/// Ordered, deduplicated set of media query definitions attached to one file
/// path. Order is declaration order from the path qualifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaQueries {
    queries: Vec<MediaQueryDefinition>,
}

impl MediaQueries {
    /// Add the definition registered for `alias`, if any. Returns false when
    /// the alias is not registered so the caller can try other variant kinds.
    /// A re-declared alias is an error.
    fn add(&mut self, path: &str, alias: &str, definitions: &[MediaQueryDefinition]) -> Result<bool> {
        let Some(definition) = definitions.iter().find(|d| d.alias == alias) else {
            return Ok(false);
        };
        if self.queries.iter().any(|q| q.alias == alias) {
            return Err(Error::DuplicateVariant {
                path: path.to_string(),
                variant: alias.to_string(),
            });
        }
        self.queries.push(definition.clone());
        Ok(true)
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn queries(&self) -> &[MediaQueryDefinition] {
        &self.queries
    }

    /// Parenthesized, `and`-joined expressions of all aliases, ready for a
    /// `@media` rule header.
    pub fn expression(&self) -> String {
        self.queries
            .iter()
            .map(|q| format!("({})", q.expression))
            .collect::<Vec<_>>()
            .join(" and ")
    }

    /// Summed definition weights, for caller-side canonical ordering of media
    /// sections.
    pub fn weight(&self) -> i32 {
        self.queries.iter().map(|q| q.weight).sum()
    }
}

/// Parsed variants of one file path: an optional locale plus media queries.
/// At most one locale per path; every other qualifier must be a registered
/// media-query alias.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variants {
    locale: Option<String>,
    media_queries: MediaQueries,
}

impl Variants {
    /// Parse an underscore-separated qualifier list, e.g. `ro_w1200`. The
    /// `path` argument is used only for error reporting. A `None` qualifier
    /// yields the empty variants value.
    pub fn parse(
        path: &str,
        qualifiers: Option<&str>,
        definitions: &[MediaQueryDefinition],
    ) -> Result<Self> {
        let mut locale: Option<String> = None;
        let mut media_queries = MediaQueries::default();

        for qualifier in qualifiers.into_iter().flat_map(|q| q.split('_')) {
            if is_locale(qualifier) {
                if locale.is_some() {
                    return Err(Error::UnrecognizedVariant {
                        path: path.to_string(),
                        variant: qualifier.to_string(),
                    });
                }
                locale = Some(qualifier.to_string());
            } else if !media_queries.add(path, qualifier, definitions)? {
                return Err(Error::UnrecognizedVariant {
                    path: path.to_string(),
                    variant: qualifier.to_string(),
                });
            }
        }

        Ok(Self {
            locale,
            media_queries,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.locale.is_none() && self.media_queries.is_empty()
    }

    /// Locale qualifier value, e.g. `en` or `en-US`, if present.
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Test against a requested locale; `None` matches paths without a locale
    /// qualifier.
    pub fn has_locale(&self, locale: Option<&str>) -> bool {
        self.locale.as_deref() == locale
    }

    pub fn has_media_queries(&self) -> bool {
        !self.media_queries.is_empty()
    }

    pub fn media_queries(&self) -> &MediaQueries {
        &self.media_queries
    }
}

/// Locale qualifier: two lowercase ISO 639 letters, optionally a dash and two
/// uppercase ISO 3166 country letters, e.g. `ro` or `ro-RO`.
fn is_locale(qualifier: &str) -> bool {
    let bytes = qualifier.as_bytes();
    match bytes.len() {
        2 => bytes.iter().all(u8::is_ascii_lowercase),
        5 => {
            bytes[0].is_ascii_lowercase()
                && bytes[1].is_ascii_lowercase()
                && bytes[2] == b'-'
                && bytes[3].is_ascii_uppercase()
                && bytes[4].is_ascii_uppercase()
        }
        _ => false,
    }
}
