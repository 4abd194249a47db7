//! Style variant composer
//!
//! Reads a base style file and appends its media-query variant siblings as
//! `@media` sections, on the fly. Used beneath a `SourceReader` so at-meta
//! references resolve identically in base and variant bodies:
//!
//! ```text
//! body { width: 1000px; }
//!
//! @media (max-width: 800px) {
//! body { width: 400px; }
//! }
//! ```

use std::collections::VecDeque;

use crate::error::Result;
use crate::path::FilePath;
use crate::project::Project;
use crate::reader::{CharRead, StringReader};

enum Segment {
    Literal(String),
    /// Variant file content, loaded when the segment is reached.
    File(FilePath),
}

/// Character stream over a base style file followed by its variant sections.
pub struct StyleReader<'a> {
    project: &'a Project,
    current: StringReader,
    queue: VecDeque<Segment>,
    /// Tracks the last emitted character so a missing final line terminator
    /// on the base file can be corrected before variant sections start.
    last_char: Option<char>,
    newline_checked: bool,
}

impl<'a> StyleReader<'a> {
    /// Create a reader for a base style file. Variant siblings share the base
    /// name and carry media-query variants; they are appended in directory
    /// enumeration order. Canonical ordering across variants, e.g. by declared
    /// weight, is the caller's responsibility.
    pub fn new(project: &'a Project, style_file: &FilePath) -> Result<Self> {
        debug_assert!(
            !style_file.has_variants(),
            "style reader decorates a base style file"
        );

        let mut queue = VecDeque::new();
        if let Some(parent) = style_file.parent() {
            for sibling in project.children(&parent)? {
                if sibling.is_style()
                    && sibling.has_basename(style_file.basename())
                    && sibling.variants().has_media_queries()
                {
                    let expression = sibling.variants().media_queries().expression();
                    queue.push_back(Segment::Literal(format!("\n@media {} {{\n", expression)));
                    queue.push_back(Segment::File(sibling));
                    queue.push_back(Segment::Literal("\n}\n".to_string()));
                }
            }
        }

        Ok(Self {
            project,
            current: StringReader::new(project.read_to_string(style_file)?),
            queue,
            last_char: None,
            newline_checked: false,
        })
    }
}

impl CharRead for StyleReader<'_> {
    fn read_char(&mut self) -> Result<Option<char>> {
        loop {
            if let Some(c) = self.current.read_char()? {
                self.last_char = Some(c);
                return Ok(Some(c));
            }
            if !self.newline_checked {
                self.newline_checked = true;
                if self.last_char != Some('\n') && self.last_char.is_some() {
                    self.current = StringReader::new("\n");
                    continue;
                }
            }
            match self.queue.pop_front() {
                None => return Ok(None),
                Some(Segment::Literal(text)) => self.current = StringReader::new(text),
                Some(Segment::File(path)) => {
                    self.current = StringReader::new(self.project.read_to_string(&path)?)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::MediaQueryDefinition;
    use crate::project::Project;

    fn fixture_project() -> Project {
        Project::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/project"))
            .with_locales(["en", "ro"])
            .with_media_query(MediaQueryDefinition::new("w1200", "max-width: 1200px", 1))
            .with_media_query(MediaQueryDefinition::new("w800", "max-width: 800px", 2))
    }

    fn read_style(path: &str) -> String {
        let project = fixture_project();
        let style_file = project.file(path).unwrap();
        let mut reader = StyleReader::new(&project, &style_file).unwrap();
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_base_with_variants() {
        let out = read_style("res/theme/theme.css");
        let base = out.find("background-color").unwrap();
        let w1200 = out.find("@media (max-width: 1200px) {").unwrap();
        let w800 = out.find("@media (max-width: 800px) {").unwrap();
        assert!(base < w1200 && w1200 < w800);
        assert_eq!(out.matches('}').count(), out.matches('{').count());
    }

    #[test]
    fn test_variant_section_framing() {
        let out = read_style("res/theme/theme.css");
        assert!(out.contains("@media (max-width: 800px) {\nbody { width: 400px; }\n}\n"));
    }

    #[test]
    fn test_base_without_variants_passes_through() {
        let out = read_style("res/compo/dialog/dialog.css");
        assert!(!out.contains("@media"));
    }
}
