//! Reference handler contract and the per-resolution cycle trace
//!
//! The handler is the seam between the resolver core and build- or
//! preview-specific output concerns: it receives every non-parameter
//! reference discovered by the substitution reader and returns the
//! replacement text - a variable value or a resource path. Concrete
//! strategies live with the host; this crate ships one in the CLI binary.

use crate::error::{Error, Result};
use crate::path::{FilePath, Reference};

/// Callback invoked when the substitution reader discovers a reference. The
/// returned value replaces the reference in the source text and must not be
/// empty; a handler unable to process a reference returns an error instead.
///
/// The resolution context carries the variable cycle trace. Handlers that
/// consult a [`crate::vars::Variables`] store forward it unchanged so one
/// logical resolution shares one trace.
pub trait ReferenceHandler {
    fn on_reference(
        &mut self,
        reference: &Reference,
        source: &FilePath,
        context: &mut ResolutionContext,
    ) -> Result<String>;
}

/// Explicit cycle-detection state for one logical resolution. Holds the stack
/// of `source:reference` markers for variable values currently being
/// resolved. Created per resolution and threaded through recursive calls;
/// never shared between concurrent resolutions.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    trace: Vec<String>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker for a (source file, reference) pair.
    pub fn marker(source: &FilePath, reference: &Reference) -> String {
        format!("{}:{}", source.value(), reference)
    }

    /// Check whether a marker is already on the stack - a revisit means the
    /// variable values reference each other in a cycle.
    pub fn is_resolving(&self, marker: &str) -> bool {
        self.trace.iter().any(|entry| entry == marker)
    }

    pub fn start_resolving(&mut self, marker: String) {
        self.trace.push(marker);
    }

    pub fn done_resolving(&mut self) {
        self.trace.pop();
    }

    pub fn depth(&self) -> usize {
        self.trace.len()
    }

    /// Circular reference error listing the active chain plus the revisited
    /// marker.
    pub fn circular_error(&self, marker: &str) -> Error {
        let mut trace = String::new();
        for entry in self.trace.iter().chain(std::iter::once(&marker.to_string())) {
            trace.push_str("\t- ");
            trace.push_str(entry);
            trace.push('\n');
        }
        Error::CircularReference { trace }
    }
}
