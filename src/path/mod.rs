//! Path and identity model: project-relative file paths, variants and at-meta
//! references.

mod file_path;
mod reference;
mod variants;

pub use file_path::{FileKind, FilePath};
pub use reference::{Reference, ReferenceType, MARK, SEPARATOR};
pub use variants::{MediaQueries, MediaQueryDefinition, Variants};
