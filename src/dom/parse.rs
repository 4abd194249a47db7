//! Recursive descent parser for the XML subset used by layouts, variables
//! files and descriptors: prolog, comments, elements, attributes, text and
//! the five predefined entities plus numeric character references.

use super::tree::{Attr, Document, NodeId};

/// Parse failure, reported with the byte offset where it occurred.
#[derive(Debug)]
pub struct XmlError {
    pub message: String,
    pub offset: usize,
}

impl std::fmt::Display for XmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

/// Parse a complete document with a single root element.
pub fn parse_document(input: &str) -> Result<Document, XmlError> {
    let mut parser = Parser {
        input: input.strip_prefix('\u{feff}').unwrap_or(input),
        pos: 0,
    };
    let mut doc = Document::new();

    parser.skip_misc()?;
    let root = parser.parse_element(&mut doc)?;
    doc.set_root(root);
    parser.skip_misc()?;
    if !parser.at_end() {
        return Err(parser.error("content after root element"));
    }
    Ok(doc)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> XmlError {
        XmlError {
            message: message.into(),
            offset: self.pos,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), XmlError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", expected)))
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Skip whitespace, the XML prolog and comments appearing outside the
    /// root element.
    fn skip_misc(&mut self) -> Result<(), XmlError> {
        loop {
            self.skip_whitespace();
            if self.rest().starts_with("<?") {
                self.skip_until("?>")?;
            } else if self.rest().starts_with("<!--") {
                self.skip_until("-->")?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_until(&mut self, terminator: &str) -> Result<(), XmlError> {
        match self.rest().find(terminator) {
            Some(index) => {
                self.pos += index + terminator.len();
                Ok(())
            }
            None => Err(self.error(format!("unterminated '{}' section", terminator))),
        }
    }

    fn parse_name(&mut self) -> Result<String, XmlError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("expected name"));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_element(&mut self, doc: &mut Document) -> Result<NodeId, XmlError> {
        self.expect('<')?;
        let name = self.parse_name()?;
        let element = doc.create_element(name.clone());

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('>') => {
                    self.bump();
                    self.parse_children(doc, element, &name)?;
                    return Ok(element);
                }
                Some('/') => {
                    self.bump();
                    self.expect('>')?;
                    return Ok(element);
                }
                Some(c) if is_name_char(c) => {
                    let attr = self.parse_attr()?;
                    doc.element_mut(element)
                        .expect("just created element")
                        .attrs
                        .push(attr);
                }
                _ => return Err(self.error(format!("malformed start tag '{}'", name))),
            }
        }
    }

    fn parse_attr(&mut self) -> Result<Attr, XmlError> {
        let name = self.parse_name()?;
        self.skip_whitespace();
        self.expect('=')?;
        self.skip_whitespace();
        let quote = match self.bump() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected quoted attribute value")),
        };
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let value = decode_entities(&self.input[start..self.pos], self.pos)?;
                self.bump();
                return Ok(Attr::new(name, value));
            }
            self.bump();
        }
        Err(self.error("unterminated attribute value"))
    }

    fn parse_children(
        &mut self,
        doc: &mut Document,
        parent: NodeId,
        name: &str,
    ) -> Result<(), XmlError> {
        loop {
            if self.rest().starts_with("<!--") {
                self.skip_until("-->")?;
                continue;
            }
            if self.rest().starts_with("</") {
                self.pos += 2;
                let end_name = self.parse_name()?;
                if end_name != name {
                    return Err(self.error(format!(
                        "mismatched end tag '</{}>', expected '</{}>'",
                        end_name, name
                    )));
                }
                self.skip_whitespace();
                self.expect('>')?;
                return Ok(());
            }
            match self.peek() {
                Some('<') => {
                    let child = self.parse_element(doc)?;
                    doc.append_child(parent, child);
                }
                Some(_) => {
                    let text = self.parse_text()?;
                    let node = doc.create_text(text);
                    doc.append_child(parent, node);
                }
                None => return Err(self.error(format!("unexpected end of input in '{}'", name))),
            }
        }
    }

    fn parse_text(&mut self) -> Result<String, XmlError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c != '<') {
            self.bump();
        }
        decode_entities(&self.input[start..self.pos], start)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

/// Decode the predefined entities and numeric character references.
fn decode_entities(text: &str, offset: usize) -> Result<String, XmlError> {
    if !text.contains('&') {
        return Ok(text.to_string());
    }
    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        decoded.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some(end) = rest.find(';') else {
            return Err(XmlError {
                message: "unterminated entity reference".to_string(),
                offset,
            });
        };
        let entity = &rest[1..end];
        match entity {
            "amp" => decoded.push('&'),
            "lt" => decoded.push('<'),
            "gt" => decoded.push('>'),
            "quot" => decoded.push('"'),
            "apos" => decoded.push('\''),
            _ => {
                let code = entity
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(str::parse))
                    .and_then(|r| r.ok())
                    .and_then(char::from_u32);
                match code {
                    Some(c) => decoded.push(c),
                    None => {
                        return Err(XmlError {
                            message: format!("unknown entity '&{};'", entity),
                            offset,
                        })
                    }
                }
            }
        }
        rest = &rest[end + 1..];
    }
    decoded.push_str(rest);
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_document() {
        let doc = parse_document("<body><h1>Title</h1></body>").unwrap();
        let root = doc.root();
        assert_eq!(doc.tag_name(root), Some("body"));
        let h1 = doc.children(root)[0];
        assert_eq!(doc.tag_name(h1), Some("h1"));
        assert_eq!(doc.text_content(h1), "Title");
    }

    #[test]
    fn test_parse_prolog_and_comments() {
        let doc = parse_document(
            "<?xml version=\"1.0\"?>\n<!-- page -->\n<body><!-- inner --><p>x</p></body>",
        )
        .unwrap();
        assert_eq!(doc.child_elements(doc.root()).len(), 1);
    }

    #[test]
    fn test_parse_attributes() {
        let doc = parse_document(r#"<div id="main" class='wide'></div>"#).unwrap();
        let root = doc.root();
        assert_eq!(doc.attr(root, "id"), Some("main"));
        assert_eq!(doc.attr(root, "class"), Some("wide"));
    }

    #[test]
    fn test_parse_self_closing() {
        let doc = parse_document(r#"<div><img src="logo.png"/><br /></div>"#).unwrap();
        assert_eq!(doc.child_elements(doc.root()).len(), 2);
    }

    #[test]
    fn test_parse_namespaced_attribute() {
        let doc = parse_document(r#"<section weft:editable="body"></section>"#).unwrap();
        assert_eq!(doc.attr(doc.root(), "weft:editable"), Some("body"));
    }

    #[test]
    fn test_entities() {
        let doc = parse_document(r#"<p title="a &amp; b">1 &lt; 2 &#x41;</p>"#).unwrap();
        let root = doc.root();
        assert_eq!(doc.attr(root, "title"), Some("a & b"));
        assert_eq!(doc.text_content(root), "1 < 2 A");
    }

    #[test]
    fn test_mismatched_end_tag() {
        assert!(parse_document("<a><b></a></b>").is_err());
    }

    #[test]
    fn test_content_after_root() {
        assert!(parse_document("<a></a><b></b>").is_err());
    }

    #[test]
    fn test_unterminated() {
        assert!(parse_document("<a><b>").is_err());
    }
}
