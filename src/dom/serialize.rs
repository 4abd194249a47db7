//! Document serialization back to markup text.

use super::tree::{Document, NodeData, NodeId};

impl Document {
    /// Serialize the whole document, root element only, no prolog.
    pub fn to_xml(&self) -> String {
        self.node_to_xml(self.root())
    }

    /// Serialize one subtree.
    pub fn node_to_xml(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            Some(NodeData::Text(text)) => out.push_str(&escape_text(text)),
            Some(NodeData::Element(element)) => {
                out.push('<');
                out.push_str(&element.name);
                for attr in &element.attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(&attr.value));
                    out.push('"');
                }
                out.push('>');
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&element.name);
                out.push('>');
            }
            None => {}
        }
    }
}

fn escape_text(text: &str) -> String {
    escape(text, false)
}

fn escape_attr(value: &str) -> String {
    escape(value, true)
}

fn escape(text: &str, quotes: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if quotes => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use crate::dom::parse_document;

    #[test]
    fn test_round_trip() {
        let source = r#"<body><h1 class="title">Hello</h1><img src="logo.png"></img></body>"#;
        let doc = parse_document(source).unwrap();
        assert_eq!(doc.to_xml(), source);
    }

    #[test]
    fn test_escaping() {
        let doc = parse_document(r#"<p title="a &amp; b">1 &lt; 2</p>"#).unwrap();
        assert_eq!(doc.to_xml(), r#"<p title="a &amp; b">1 &lt; 2</p>"#);
    }

    #[test]
    fn test_self_closing_expands() {
        let doc = parse_document("<div><br/></div>").unwrap();
        assert_eq!(doc.to_xml(), "<div><br></br></div>");
    }
}
