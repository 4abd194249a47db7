//! Source reader with at-meta reference processing
//!
//! Decorates a character stream, looking for at-meta references and invoking
//! the external [`ReferenceHandler`] when one is discovered; `@param`
//! references are resolved from the active [`LayoutParameters`] instead.
//! Variable values may themselves contain references: the handler typically
//! re-enters [`crate::vars::Variables::resolve`], which re-reads the found
//! value through [`SourceReader::from_value`], walking the reference tree
//! depth-first. The variable store guards that recursion against cycles.
//!
//! A doubled `@@` escapes a literal `@`. Accumulated text that does not parse
//! as a reference is emitted verbatim, so a literal `@` in source syntax,
//! e.g. CSS `@media`, passes through untouched.

use crate::compo::LayoutParameters;
use crate::error::{Error, Result};
use crate::handler::{ReferenceHandler, ResolutionContext};
use crate::path::{FilePath, Reference, ReferenceType, MARK, SEPARATOR};
use crate::project::Project;
use crate::reader::{CharRead, LayoutScanner, StringReader};

enum State {
    /// Source text, outside any reference.
    Text,
    /// A reference was resolved; its value is returning char by char, then
    /// the terminating character is replayed.
    Value {
        chars: Vec<char>,
        index: usize,
        after: Option<char>,
    },
}

/// Character stream decorator substituting at-meta references.
pub struct SourceReader<'a> {
    source_file: FilePath,
    base: Box<dyn CharRead + 'a>,
    handler: &'a mut dyn ReferenceHandler,
    context: &'a mut ResolutionContext,
    /// Parameter scope, present only when reading a template or widget layout
    /// on behalf of an invocation.
    parameters: Option<&'a LayoutParameters>,
    state: State,
}

impl<'a> SourceReader<'a> {
    /// Reader over a project source file. Layout sources are wrapped in the
    /// structural scanner.
    pub fn new(
        project: &Project,
        source_file: &FilePath,
        handler: &'a mut dyn ReferenceHandler,
        context: &'a mut ResolutionContext,
    ) -> Result<Self> {
        let content = project.read_to_string(source_file)?;
        Ok(Self::wrap(source_file.clone(), content, None, handler, context))
    }

    /// Reader for a template or widget layout with an invocation parameter
    /// scope. The scope may be empty; its absence, not its emptiness, is what
    /// makes `@param` references an error.
    pub fn with_parameters(
        project: &Project,
        source_file: &FilePath,
        parameters: &'a LayoutParameters,
        handler: &'a mut dyn ReferenceHandler,
        context: &'a mut ResolutionContext,
    ) -> Result<Self> {
        let content = project.read_to_string(source_file)?;
        Ok(Self::wrap(
            source_file.clone(),
            content,
            Some(parameters),
            handler,
            context,
        ))
    }

    /// Reader over an in-memory value, used when resolving references nested
    /// inside variable values. Never wraps the structural scanner.
    pub fn from_value(
        value: impl Into<String>,
        source_file: &FilePath,
        handler: &'a mut dyn ReferenceHandler,
        context: &'a mut ResolutionContext,
    ) -> Self {
        Self::from_reader(
            Box::new(StringReader::new(value)),
            source_file,
            handler,
            context,
        )
    }

    /// Reader decorating an arbitrary base stream, typically a
    /// [`crate::reader::StyleReader`] so that references resolve identically
    /// in base and variant bodies.
    pub fn from_reader(
        base: Box<dyn CharRead + 'a>,
        source_file: &FilePath,
        handler: &'a mut dyn ReferenceHandler,
        context: &'a mut ResolutionContext,
    ) -> Self {
        Self {
            source_file: source_file.clone(),
            base,
            handler,
            context,
            parameters: None,
            state: State::Text,
        }
    }

    fn wrap(
        source_file: FilePath,
        content: String,
        parameters: Option<&'a LayoutParameters>,
        handler: &'a mut dyn ReferenceHandler,
        context: &'a mut ResolutionContext,
    ) -> Self {
        let reader = StringReader::new(content);
        let base: Box<dyn CharRead> = if source_file.is_layout() {
            Box::new(LayoutScanner::new(Box::new(reader), source_file.clone()))
        } else {
            Box::new(reader)
        };
        Self {
            source_file,
            base,
            handler,
            context,
            parameters,
            state: State::Text,
        }
    }

    pub fn source_file(&self) -> &FilePath {
        &self.source_file
    }

    /// Collect the at-meta text starting at an already-consumed mark, resolve
    /// it and switch to value emission. Returns the first character to emit.
    fn process_meta(&mut self) -> Result<Option<char>> {
        let mut builder = MetaBuilder::new();
        let mut c = Some(MARK);
        while builder.add(c) {
            c = self.base.read_char()?;
        }

        let value = match builder.reference(&self.source_file)? {
            Some(reference) if reference.reference_type() == ReferenceType::Param => {
                match self.parameters {
                    Some(parameters) => parameters.value(&self.source_file, reference.name())?,
                    None => {
                        return Err(Error::MissingParameters {
                            path: self.source_file.value().to_string(),
                            reference: reference.to_string(),
                        })
                    }
                }
            }
            Some(reference) => {
                let value =
                    self.handler
                        .on_reference(&reference, &self.source_file, &mut *self.context)?;
                if value.is_empty() {
                    return Err(Error::UnresolvedReference {
                        path: self.source_file.value().to_string(),
                        reference: reference.to_string(),
                    });
                }
                value
            }
            // not a recognized reference: send accumulated text back unchanged
            None => builder.into_text(),
        };

        self.state = State::Value {
            chars: value.chars().collect(),
            index: 0,
            after: c,
        };
        self.read_char()
    }
}

impl CharRead for SourceReader<'_> {
    fn read_char(&mut self) -> Result<Option<char>> {
        match &mut self.state {
            State::Text => {
                let c = self.base.read_char()?;
                if c != Some(MARK) {
                    return Ok(c);
                }
                self.process_meta()
            }
            State::Value {
                chars,
                index,
                after,
            } => {
                if *index < chars.len() {
                    let c = chars[*index];
                    *index += 1;
                    return Ok(Some(c));
                }
                // value exhausted, replay the character terminating the meta
                let after = *after;
                self.state = State::Text;
                match after {
                    Some(c) => Ok(Some(c)),
                    None => Ok(None),
                }
            }
        }
    }
}

/// Collects at-meta reference characters once the mark is discovered, until a
/// character outside the reference class or end of stream. Also detects the
/// `@@` escape sequence.
struct MetaBuilder {
    buffer: String,
    separator: Option<usize>,
    escape: bool,
}

impl MetaBuilder {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            separator: None,
            escape: false,
        }
    }

    /// Store a character and return true while collecting should continue.
    /// On the `@@` escape the buffer collapses to a single literal mark and
    /// the character after the escape terminates collection.
    fn add(&mut self, c: Option<char>) -> bool {
        if self.escape {
            self.buffer.clear();
            self.buffer.push(MARK);
            return false;
        }
        let Some(c) = c else {
            return false;
        };
        if !is_meta_char(c) {
            return false;
        }
        if self.separator.is_none() && c == SEPARATOR {
            self.separator = Some(self.buffer.len());
        }
        self.buffer.push(c);
        if self.buffer.len() == 2 && self.buffer == "@@" {
            self.escape = true;
        }
        true
    }

    /// The parsed reference, or `None` on escape or unrecognizable text, in
    /// which case the buffer still holds the original source text.
    fn reference(&self, source_file: &FilePath) -> Result<Option<Reference>> {
        if self.escape {
            return Ok(None);
        }
        let Some(separator) = self.separator else {
            return Ok(None);
        };
        let token = &self.buffer[1..separator];
        let name = &self.buffer[separator + 1..];
        if token.is_empty() || name.is_empty() {
            return Ok(None);
        }
        Reference::new(
            source_file.value(),
            ReferenceType::from_token(token),
            name,
        )
        .map(Some)
    }

    fn into_text(self) -> String {
        self.buffer
    }
}

fn is_meta_char(c: char) -> bool {
    Reference::is_name_char(c) || c == MARK || c == SEPARATOR
}
