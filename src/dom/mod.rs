//! In-memory document tree used by the component resolver: slotmap arena,
//! markup parser and serializer.

mod parse;
mod serialize;
mod tree;

pub use parse::{parse_document, XmlError};
pub use tree::{Attr, Document, Element, NodeData, NodeId};
