//! Component relation operators
//!
//! Operators are the attributes layout files use to declare component
//! relations: template inheritance, content injection, editable areas, widget
//! composition, invocation parameters and script class binding. Projects
//! choose one of three attribute naming strategies; the strategy is selected
//! once, at project configuration, and used through the `OperatorsHandler`
//! trait everywhere else.

use serde::Deserialize;

use crate::dom::{Document, NodeId};

/// Operators recognized in layout files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Declares the template a content fragment extends; operand is the
    /// template component path, optionally `path#editable`.
    Template,
    /// Marks an element as content for a named template editable.
    Content,
    /// Defines an editable area inside a template.
    Editable,
    /// Inserts a widget component; operand is the widget component path.
    Compo,
    /// Invocation parameter list, `name:value;name:value`.
    Param,
    /// Binds a script class to the element.
    Class,
}

impl Operator {
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Template => "template",
            Operator::Content => "content",
            Operator::Editable => "editable",
            Operator::Compo => "compo",
            Operator::Param => "param",
            Operator::Class => "class",
        }
    }
}

/// Attribute naming strategy declared by the project descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperatorsNaming {
    /// Namespace-prefixed attributes, `weft:template="..."`; the layout root
    /// declares `xmlns:weft`.
    Xmlns,
    /// HTML5 data attributes, `data-template="..."`.
    #[default]
    DataAttr,
    /// Plain attribute names, `template="..."`. Terse but can collide with
    /// standard HTML attributes.
    Attr,
}

impl OperatorsNaming {
    pub fn handler(&self) -> Box<dyn OperatorsHandler> {
        match self {
            OperatorsNaming::Xmlns => Box::new(XmlnsOperators),
            OperatorsNaming::DataAttr => Box::new(DataOperators),
            OperatorsNaming::Attr => Box::new(AttrOperators),
        }
    }
}

/// Operator access over document elements. Implementations differ only in how
/// operator attributes are named.
pub trait OperatorsHandler {
    /// Attribute name encoding the given operator.
    fn attr_name(&self, operator: Operator) -> String;

    /// Namespace declaration attribute to strip from resolved documents, if
    /// the strategy uses one.
    fn namespace_declaration(&self) -> Option<&'static str> {
        None
    }

    /// Elements of the subtree carrying the operator, document order.
    fn find_by_operator(&self, doc: &Document, start: NodeId, operator: Operator) -> Vec<NodeId> {
        let name = self.attr_name(operator);
        doc.descendant_elements(start)
            .into_iter()
            .filter(|&id| doc.attr(id, &name).is_some())
            .collect()
    }

    /// First element of the subtree where the operator has the given operand.
    fn get_by_operator(
        &self,
        doc: &Document,
        start: NodeId,
        operator: Operator,
        operand: &str,
    ) -> Option<NodeId> {
        let name = self.attr_name(operator);
        doc.descendant_elements(start)
            .into_iter()
            .find(|&id| doc.attr(id, &name) == Some(operand))
    }

    /// Operand of the operator on one element, if present.
    fn operand(&self, doc: &Document, node: NodeId, operator: Operator) -> Option<String> {
        doc.attr(node, &self.attr_name(operator)).map(str::to_string)
    }

    fn remove_operator(&self, doc: &mut Document, node: NodeId, operator: Operator) {
        doc.remove_attr(node, &self.attr_name(operator));
    }
}

/// Namespace prefix used by the xmlns naming strategy.
pub const NS_PREFIX: &str = "weft";

pub struct XmlnsOperators;

impl OperatorsHandler for XmlnsOperators {
    fn attr_name(&self, operator: Operator) -> String {
        format!("{}:{}", NS_PREFIX, operator.token())
    }

    fn namespace_declaration(&self) -> Option<&'static str> {
        Some("xmlns:weft")
    }
}

pub struct DataOperators;

impl OperatorsHandler for DataOperators {
    fn attr_name(&self, operator: Operator) -> String {
        format!("data-{}", operator.token())
    }
}

pub struct AttrOperators;

impl OperatorsHandler for AttrOperators {
    fn attr_name(&self, operator: Operator) -> String {
        match operator {
            // plain `class` would collide with the standard HTML attribute
            Operator::Class => "data-class".to_string(),
            _ => operator.token().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document;

    #[test]
    fn test_attr_names() {
        assert_eq!(XmlnsOperators.attr_name(Operator::Compo), "weft:compo");
        assert_eq!(DataOperators.attr_name(Operator::Compo), "data-compo");
        assert_eq!(AttrOperators.attr_name(Operator::Compo), "compo");
    }

    #[test]
    fn test_find_by_operator() {
        let doc = parse_document(
            r#"<body><section data-editable="main"></section><aside data-editable="side"></aside></body>"#,
        )
        .unwrap();
        let handler = DataOperators;
        let found = handler.find_by_operator(&doc, doc.root(), Operator::Editable);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_get_by_operator_operand() {
        let doc = parse_document(
            r#"<body><section data-editable="main"></section><aside data-editable="side"></aside></body>"#,
        )
        .unwrap();
        let handler = DataOperators;
        let side = handler
            .get_by_operator(&doc, doc.root(), Operator::Editable, "side")
            .unwrap();
        assert_eq!(doc.tag_name(side), Some("aside"));
        assert!(handler
            .get_by_operator(&doc, doc.root(), Operator::Editable, "missing")
            .is_none());
    }

    #[test]
    fn test_remove_operator() {
        let mut doc = parse_document(r#"<div weft:compo="lib/dialog"></div>"#).unwrap();
        let root = doc.root();
        let handler = XmlnsOperators;
        assert_eq!(
            handler.operand(&doc, root, Operator::Compo).as_deref(),
            Some("lib/dialog")
        );
        handler.remove_operator(&mut doc, root, Operator::Compo);
        assert!(handler.operand(&doc, root, Operator::Compo).is_none());
    }

    #[test]
    fn test_naming_selection() {
        let handler = OperatorsNaming::Attr.handler();
        assert_eq!(handler.attr_name(Operator::Param), "param");
        assert_eq!(handler.namespace_declaration(), None);
        let xmlns = OperatorsNaming::Xmlns.handler();
        assert_eq!(xmlns.namespace_declaration(), Some("xmlns:weft"));
    }
}
