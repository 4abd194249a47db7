//! Project-relative file paths
//!
//! A file path always uses slash as separator, is relative to the project
//! root and never starts with a separator. The file name may carry variants,
//! separated by underscore, between the base name and the extension:
//!
//! ```text
//! file-path    = *path-segment base-name *variant DOT extension
//! path-segment = 1*CH "/"
//! base-name    = 1*CH
//! variant      = "_" 1*(ALPHA / DIGIT / "-")
//! extension    = 1*(ALPHA / DIGIT)
//! CH           = ALPHA / DIGIT / "-" / "."
//! ```
//!
//! A path without extension denotes a directory and normalizes to a trailing
//! separator. Underscore is reserved for the variants separator and is not
//! valid in names.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};
use crate::path::variants::{MediaQueryDefinition, Variants};

/// File kind, derived from the path extension. Directories have no extension
/// and no kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// UI structure document, `htm` or `html` extension.
    Layout,
    /// Style sheet, `css` extension.
    Style,
    /// Behavior file, `js` extension.
    Script,
    /// Variables definition or component descriptor, `xml` extension.
    Xml,
    /// Any other extension: images, fonts, audio, video.
    Media,
    /// Directories.
    None,
}

impl FileKind {
    fn for_extension(extension: &str) -> FileKind {
        match extension.to_ascii_lowercase().as_str() {
            "htm" | "html" => FileKind::Layout,
            "css" => FileKind::Style,
            "js" => FileKind::Script,
            "xml" => FileKind::Xml,
            _ => FileKind::Media,
        }
    }

    /// Canonical extension used when cloning a path to a related kind.
    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Layout => "htm",
            FileKind::Style => "css",
            FileKind::Script => "js",
            FileKind::Xml => "xml",
            FileKind::Media | FileKind::None => "",
        }
    }
}

/// Immutable project-relative path value. Directories always end with a
/// separator; equality and hashing use the normalized string value.
#[derive(Debug, Clone)]
pub struct FilePath {
    /// Normalized path value relative to project root.
    value: String,
    /// All path segments, final name included.
    segments: Vec<String>,
    /// Parent directory value, empty for top-level entries.
    parent_path: String,
    /// Immediate parent directory name, empty for top-level entries.
    parent_name: String,
    /// File name without variants and extension.
    basename: String,
    /// File name with extension but without variants; directory name for
    /// directories.
    file_name: String,
    kind: FileKind,
    directory: bool,
    variants: Variants,
}

const NAME_CHARS: fn(char) -> bool = |c| c.is_ascii_alphanumeric() || c == '-' || c == '.';

impl FilePath {
    /// Parse a project-relative path value. Variants on the final segment are
    /// validated against the given media-query definitions.
    pub fn parse(value: &str, definitions: &[MediaQueryDefinition]) -> Result<FilePath> {
        if value.is_empty() {
            return Err(Error::InvalidPath {
                path: value.to_string(),
            });
        }
        if value == "." {
            return Ok(FilePath {
                value: ".".to_string(),
                segments: Vec::new(),
                parent_path: String::new(),
                parent_name: String::new(),
                basename: String::new(),
                file_name: String::new(),
                kind: FileKind::None,
                directory: true,
                variants: Variants::default(),
            });
        }

        let trailing_separator = value.ends_with('/');
        let trimmed = value.trim_end_matches('/');
        let segments: Vec<String> = trimmed.split('/').map(str::to_string).collect();
        // underscore is reserved for variants and may appear in the final
        // segment only; parent segments take plain name characters
        let invalid = segments.iter().enumerate().any(|(i, s)| {
            s.is_empty()
                || if i + 1 == segments.len() {
                    !s.chars().all(is_segment_char)
                } else {
                    !s.chars().all(NAME_CHARS)
                }
        });
        if invalid {
            return Err(Error::InvalidPath {
                path: value.to_string(),
            });
        }

        let last = segments.last().expect("split yields at least one segment");
        let parent_segments = &segments[..segments.len() - 1];
        let parent_path = if parent_segments.is_empty() {
            String::new()
        } else {
            format!("{}/", parent_segments.join("/"))
        };
        let parent_name = parent_segments.last().cloned().unwrap_or_default();

        // a final segment with an extension is a file, anything else a directory
        if !trailing_separator {
            if let Some((name_part, extension)) = split_extension(last) {
                let (basename, qualifiers) = match name_part.split_once('_') {
                    Some((base, qualifiers)) => (base, Some(qualifiers)),
                    None => (name_part, None),
                };
                if basename.is_empty() || !basename.chars().all(NAME_CHARS) {
                    return Err(Error::InvalidPath {
                        path: value.to_string(),
                    });
                }
                let variants = Variants::parse(value, qualifiers, definitions)?;
                return Ok(FilePath {
                    value: value.to_string(),
                    parent_path,
                    parent_name,
                    basename: basename.to_string(),
                    file_name: format!("{}.{}", basename, extension),
                    kind: FileKind::for_extension(extension),
                    directory: false,
                    variants,
                    segments,
                });
            }
        }

        if last.contains('_') {
            // underscore is reserved for file variants; directories cannot carry it
            return Err(Error::InvalidPath {
                path: value.to_string(),
            });
        }

        Ok(FilePath {
            value: format!("{}/", trimmed),
            parent_path,
            parent_name,
            basename: last.to_string(),
            file_name: last.to_string(),
            kind: FileKind::None,
            directory: true,
            variants: Variants::default(),
            segments,
        })
    }

    /// Normalized path value, relative to the project root. Never starts with
    /// a separator; directories end with one.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// File name with extension but without variants.
    pub fn name(&self) -> &str {
        &self.file_name
    }

    /// File name without variants and extension.
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Test if this file base name equals the given name.
    pub fn has_basename(&self, name: &str) -> bool {
        self.basename == name
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn is_directory(&self) -> bool {
        self.directory
    }

    pub fn is_project_root(&self) -> bool {
        self.value == "."
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    pub fn variants(&self) -> &Variants {
        &self.variants
    }

    /// Parent directory, `None` for top-level entries.
    pub fn parent(&self) -> Option<FilePath> {
        if self.parent_path.is_empty() {
            return None;
        }
        // parent directories carry no variants, re-parsing cannot fail on them
        FilePath::parse(&self.parent_path, &[]).ok()
    }

    pub fn is_layout(&self) -> bool {
        self.kind == FileKind::Layout
    }

    pub fn is_style(&self) -> bool {
        self.kind == FileKind::Style
    }

    pub fn is_script(&self) -> bool {
        self.kind == FileKind::Script
    }

    pub fn is_media(&self) -> bool {
        self.kind == FileKind::Media
    }

    /// A component descriptor is an XML file with the same base name as its
    /// parent directory.
    pub fn is_descriptor(&self) -> bool {
        self.kind == FileKind::Xml && self.basename == self.parent_name
    }

    /// A variables definition file has XML extension but not the parent
    /// directory's name. Descriptors and variables differ only by base name.
    pub fn is_variables(&self) -> bool {
        self.kind == FileKind::Xml && self.basename != self.parent_name
    }

    /// Clone this path to a sibling of the given kind: same directory, same
    /// base name and variants, related extension. Used to locate the style,
    /// script or descriptor sibling of a layout file.
    pub fn related(&self, kind: FileKind) -> FilePath {
        debug_assert!(!self.directory, "related file of a directory");
        let mut value = match self.value.rfind('.') {
            Some(dot) => self.value[..dot].to_string(),
            None => self.value.clone(),
        };
        value.push('.');
        value.push_str(kind.extension());

        let mut related = self.clone();
        related.value = value;
        related.file_name = format!("{}.{}", self.basename, kind.extension());
        related.kind = kind;
        if let Some(last) = related.segments.last_mut() {
            *last = related
                .value
                .rsplit('/')
                .next()
                .unwrap_or(&related.value)
                .to_string();
        }
        related
    }

    /// Path of a direct child with the given name. Valid on directories only.
    pub fn child(&self, name: &str, definitions: &[MediaQueryDefinition]) -> Result<FilePath> {
        debug_assert!(self.directory, "child of a non-directory");
        let base = if self.is_project_root() { "" } else { &self.value };
        FilePath::parse(&format!("{}{}", base, name), definitions)
    }
}

fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_'
}

/// Split `name.ext` on the last dot; returns `None` when there is no
/// extension, which makes the segment a directory name.
fn split_extension(segment: &str) -> Option<(&str, &str)> {
    let dot = segment.rfind('.')?;
    let (name, extension) = (&segment[..dot], &segment[dot + 1..]);
    if name.is_empty() || extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some((name, extension))
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl PartialEq for FilePath {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for FilePath {}

impl Hash for FilePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}
