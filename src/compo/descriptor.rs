//! Component descriptor
//!
//! An optional XML sibling of the component layout, with the component
//! directory's name. It carries presentation meta-data; at-meta references
//! inside it are resolved while reading, the same as any other source.

use crate::dom::parse_document;
use crate::error::{Error, Result};
use crate::handler::{ReferenceHandler, ResolutionContext};
use crate::path::FilePath;
use crate::project::Project;
use crate::reader::{CharRead, SourceReader};

#[derive(Debug, Default, Clone)]
pub struct ComponentDescriptor {
    display: Option<String>,
    description: Option<String>,
}

impl ComponentDescriptor {
    /// Load a descriptor file, `None` when the component has no descriptor.
    pub fn load(
        project: &Project,
        file: &FilePath,
        handler: &mut dyn ReferenceHandler,
        context: &mut ResolutionContext,
    ) -> Result<Option<ComponentDescriptor>> {
        if !project.exists(file) {
            return Ok(None);
        }
        let mut content = String::new();
        SourceReader::new(project, file, handler, context)?.read_to_string(&mut content)?;
        let doc = parse_document(&content).map_err(|e| Error::InvalidDocument {
            path: file.value().to_string(),
            message: e.to_string(),
        })?;

        let mut descriptor = ComponentDescriptor::default();
        for child in doc.child_elements(doc.root()) {
            let value = doc.text_content(child).trim().to_string();
            match doc.tag_name(child) {
                Some("display") => descriptor.display = Some(value),
                Some("description") => descriptor.description = Some(value),
                _ => {}
            }
        }
        Ok(Some(descriptor))
    }

    /// Component display name, falling back to the given default.
    pub fn display_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.display.as_deref().unwrap_or(default)
    }

    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
