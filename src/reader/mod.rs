//! Streaming character readers
//!
//! Source processing is modeled as pull-based, finite, single-pass character
//! sequences that compose by wrapping: the variant composer sits beneath the
//! reference substitution reader, which wraps the structural scanner for
//! layout sources. The trait mirrors a classic read-into-buffer surface while
//! keeping per-character access for the state machines.

mod layout;
mod source;
mod style;

pub use layout::LayoutScanner;
pub use source::SourceReader;
pub use style::StyleReader;

use crate::error::Result;

/// Pull-based character stream. Streams are finite and not restartable.
pub trait CharRead {
    /// Next character, `None` at end of stream.
    fn read_char(&mut self) -> Result<Option<char>>;

    /// Fill a buffer; returns the number of characters written, 0 at end of
    /// stream.
    fn read(&mut self, buf: &mut [char]) -> Result<usize> {
        let mut count = 0;
        while count < buf.len() {
            match self.read_char()? {
                Some(c) => {
                    buf[count] = c;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }

    /// Drain the stream into a string; returns the number of characters read.
    fn read_to_string(&mut self, out: &mut String) -> Result<usize> {
        let mut count = 0;
        while let Some(c) = self.read_char()? {
            out.push(c);
            count += 1;
        }
        Ok(count)
    }
}

/// In-memory character stream over an owned string.
pub struct StringReader {
    chars: Vec<char>,
    pos: usize,
}

impl StringReader {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            chars: content.into().chars().collect(),
            pos: 0,
        }
    }
}

impl CharRead for StringReader {
    fn read_char(&mut self) -> Result<Option<char>> {
        let c = self.chars.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        Ok(c)
    }
}
