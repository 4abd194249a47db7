//! Weft - declarative UI component compiler
//!
//! Weft resolves a tree of declarative component sources - layout markup,
//! localized variables, style and script siblings - into one fully
//! substituted document. Components interconnect through two relations:
//! inheritance, via templates with editable areas, and composition, via
//! widget inclusion. While layouts are read, at-meta references like
//! `@string/title` or `@image/logo` are replaced on the fly; variables come
//! from per-directory stores with locale fallback, everything else from an
//! externally supplied [`ReferenceHandler`].
//!
//! # Example
//!
//! ```no_run
//! use weft::{Project, ReferenceHandler, ResolutionContext};
//! use weft::{FilePath, Reference, Result};
//!
//! struct EchoHandler;
//!
//! impl ReferenceHandler for EchoHandler {
//!     fn on_reference(
//!         &mut self,
//!         reference: &Reference,
//!         _source: &FilePath,
//!         _context: &mut ResolutionContext,
//!     ) -> Result<String> {
//!         Ok(reference.to_string())
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let project = Project::open("demo")?;
//!     let mut handler = EchoHandler;
//!     let component = weft::resolve(&project, "res/page/index", &mut handler)?;
//!     println!("{}", component.layout().to_xml());
//!     Ok(())
//! }
//! ```

pub mod compo;
pub mod dom;
pub mod error;
pub mod handler;
pub mod operators;
pub mod path;
pub mod project;
pub mod reader;
pub mod vars;

pub use compo::{Component, ComponentDescriptor, LayoutParameters};
pub use error::{Error, Result};
pub use handler::{ReferenceHandler, ResolutionContext};
pub use operators::{Operator, OperatorsHandler, OperatorsNaming};
pub use path::{
    FileKind, FilePath, MediaQueries, MediaQueryDefinition, Reference, ReferenceType, Variants,
};
pub use project::{Project, ScriptEntry};
pub use reader::{CharRead, SourceReader, StringReader, StyleReader};
pub use vars::{Variables, VariablesCache};

/// Resolve a component given either its directory path, e.g.
/// `res/page/index`, or its layout file path, e.g.
/// `res/page/index/index.htm`.
pub fn resolve(
    project: &Project,
    component: &str,
    handler: &mut dyn ReferenceHandler,
) -> Result<Component> {
    let layout_path = if component.ends_with(".htm") || component.ends_with(".html") {
        project.file(component)?
    } else {
        project.component_layout(component)?
    };
    Component::resolve(project, &layout_path, handler)
}
