//! Error types for path parsing, resource resolution and component composition

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving a component tree. All variants are fatal to
/// the current resolution; none are retried. Each variant carries the
/// originating source path and, where relevant, the offending reference or
/// variant text.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed project-relative path.
    #[error("invalid file path '{path}'")]
    InvalidPath { path: String },

    /// Path qualifier matches neither the locale pattern nor a registered
    /// media-query alias.
    #[error("unrecognized variant '{variant}' on file '{path}'")]
    UnrecognizedVariant { path: String, variant: String },

    /// Media-query alias declared twice on the same path.
    #[error("media query alias '{variant}' redeclared on file '{path}'")]
    DuplicateVariant { path: String, variant: String },

    /// Variable-kind reference carrying a sub-path, e.g. `@string/menu/title`.
    #[error("variable reference '{text}' with sub-path in '{path}'")]
    InvalidReference { path: String, text: String },

    /// Variable resolution revisited an active (file, reference) pair.
    #[error("circular variable references; trace stack follows:\n{trace}")]
    CircularReference { trace: String },

    /// `@param` reference found but the reader has no parameter scope.
    #[error("found @param reference '{reference}' but missing layout parameters for source file '{path}'")]
    MissingParameters { path: String, reference: String },

    /// `@param` reference names a parameter the invocation did not define.
    #[error("undefined layout parameter '{name}' in source file '{path}'")]
    UndefinedParameter { path: String, name: String },

    /// Reference handler produced no value for a non-variable reference.
    #[error("unresolved reference '{reference}' in source file '{path}'")]
    UnresolvedReference { path: String, reference: String },

    /// Content fragment names an editable the template does not declare.
    #[error("missing editable '{name}' in template '{template}' requested from '{path}'")]
    MissingEditable {
        path: String,
        template: String,
        name: String,
    },

    /// Template or widget nesting exceeded the depth guard.
    #[error("too many nesting levels on '{path}'; circular component references suspected")]
    CircularComposition { path: String },

    /// Script class declared by a layout has no indexed script file.
    #[error("broken script reference; no script file for class '{class}' requested from '{path}'")]
    BrokenScriptReference { path: String, class: String },

    /// Referenced component layout file does not exist.
    #[error("missing component layout '{path}' requested from '{parent}'")]
    MissingLayout { path: String, parent: String },

    /// Layout or descriptor document failed to parse. Variables files with
    /// unrecognized root elements are skipped instead, see `Variables::load`.
    #[error("invalid document '{path}': {message}")]
    InvalidDocument { path: String, message: String },

    /// Filesystem failure on a project file.
    #[error("i/o failure on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed project descriptor.
    #[error("invalid project descriptor: {0}")]
    Descriptor(#[from] toml::de::Error),
}

impl Error {
    /// Wrap an i/o error together with the path it occurred on.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
