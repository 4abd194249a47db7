//! Arena-backed document tree: insert, remove, import, attribute merge.

use slotmap::{new_key_type, SecondaryMap, SlotMap};

new_key_type! {
    /// Unique identifier for a document node. Copy, lightweight.
    pub struct NodeId;
}

/// A single attribute. Attribute order is preserved as authored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Element payload: tag name plus ordered attributes.
#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attr>,
}

/// Node payload, either an element or a text run.
#[derive(Debug, Clone)]
pub enum NodeData {
    Element(Element),
    Text(String),
}

/// Mutable document tree backed by a slotmap arena. All nodes live in one
/// `SlotMap`; parent/child links are stored in secondary maps so removal is
/// O(subtree) and lookup O(1).
#[derive(Debug, Default)]
pub struct Document {
    nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    root: Option<NodeId>,
}

const EMPTY_CHILDREN: &[NodeId] = &[];

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root element id.
    ///
    /// # Panics
    ///
    /// Panics if the document is empty; parsed documents always have a root.
    pub fn root(&self) -> NodeId {
        self.root.expect("document has no root")
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.nodes.insert(NodeData::Element(Element {
            name: name.into(),
            attrs: Vec::new(),
        }));
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        let id = self.nodes.insert(NodeData::Text(text.into()));
        self.children.insert(id, Vec::new());
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id), Some(NodeData::Element(_)))
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.nodes.get(id) {
            Some(NodeData::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Element children only, authored order.
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    /// Append a detached node as last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes.contains_key(parent), "parent does not exist");
        debug_assert!(
            self.parent.get(child).is_none(),
            "child is already attached"
        );
        self.parent.insert(child, parent);
        self.children
            .get_mut(parent)
            .expect("parent must have children vec")
            .push(child);
    }

    /// Insert a detached node immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, node: NodeId) {
        let parent = self.parent(sibling).expect("sibling has no parent");
        let siblings = self
            .children
            .get_mut(parent)
            .expect("parent must have children vec");
        let index = siblings
            .iter()
            .position(|&c| c == sibling)
            .expect("sibling not under its parent");
        siblings.insert(index, node);
        self.parent.insert(node, parent);
    }

    /// Detach a node from its parent, keeping the subtree alive.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.retain(|&c| c != id);
            }
        }
    }

    /// Remove a node and all its descendants.
    pub fn remove(&mut self, id: NodeId) {
        if !self.nodes.contains_key(id) {
            return;
        }
        self.detach(id);
        if self.root == Some(id) {
            self.root = None;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(kids) = self.children.remove(current) {
                stack.extend(kids);
            }
            self.parent.remove(current);
            self.nodes.remove(current);
        }
    }

    /// Detach and drop all children of a node.
    pub fn remove_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.remove(child);
        }
    }

    /// Pre-order depth-first traversal from `start`, the start node included.
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Element nodes of the subtree in document order, `start` included.
    pub fn descendant_elements(&self, start: NodeId) -> Vec<NodeId> {
        self.descendants(start)
            .into_iter()
            .filter(|&id| self.is_element(id))
            .collect()
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut content = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                content.push_str(text);
            }
        }
        content
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        match element.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => element.attrs.push(Attr::new(name, value)),
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(element) = self.element_mut(id) {
            element.attrs.retain(|a| a.name != name);
        }
    }

    /// Merge attributes onto `target` without overwriting: existing target
    /// attributes win, except `class` whose values union - target classes
    /// first, then incoming, duplicates dropped.
    pub fn merge_attrs(&mut self, target: NodeId, attrs: &[Attr]) {
        for attr in attrs {
            if attr.name == "class" {
                let merged = merge_classes(self.attr(target, "class"), &attr.value);
                self.set_attr(target, "class", &merged);
            } else if self.attr(target, &attr.name).is_none() {
                self.set_attr(target, &attr.name, &attr.value);
            }
        }
    }

    /// Deep-copy a subtree from another document into this one. The copy is
    /// returned detached.
    pub fn import(&mut self, source: &Document, node: NodeId) -> NodeId {
        let copy = match source.data(node).expect("imported node must exist") {
            NodeData::Element(element) => {
                let id = self.create_element(element.name.clone());
                self.element_mut(id)
                    .expect("just created element")
                    .attrs
                    .clone_from(&element.attrs);
                id
            }
            NodeData::Text(text) => self.create_text(text.clone()),
        };
        for &child in source.children(node) {
            let child_copy = self.import(source, child);
            self.append_child(copy, child_copy);
        }
        copy
    }
}

/// Union of space-separated class lists, existing classes first.
fn merge_classes(existing: Option<&str>, incoming: &str) -> String {
    let mut classes: Vec<&str> = Vec::new();
    for class in existing
        .unwrap_or_default()
        .split_ascii_whitespace()
        .chain(incoming.split_ascii_whitespace())
    {
        if !classes.contains(&class) {
            classes.push(class);
        }
    }
    classes.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.create_element("body");
        let section = doc.create_element("section");
        doc.append_child(root, section);
        let text = doc.create_text("caption");
        doc.append_child(section, text);
        (doc, root, section, text)
    }

    #[test]
    fn test_tree_links() {
        let (doc, root, section, text) = build();
        assert_eq!(doc.root(), root);
        assert_eq!(doc.children(root), &[section]);
        assert_eq!(doc.parent(text), Some(section));
        assert_eq!(doc.tag_name(section), Some("section"));
    }

    #[test]
    fn test_text_content() {
        let (doc, root, ..) = build();
        assert_eq!(doc.text_content(root), "caption");
    }

    #[test]
    fn test_remove_subtree() {
        let (mut doc, root, section, text) = build();
        doc.remove(section);
        assert!(doc.children(root).is_empty());
        assert!(!doc.contains(section));
        assert!(!doc.contains(text));
    }

    #[test]
    fn test_insert_before() {
        let (mut doc, root, section, _) = build();
        let header = doc.create_element("header");
        doc.insert_before(section, header);
        assert_eq!(doc.children(root), &[header, section]);
    }

    #[test]
    fn test_attrs() {
        let (mut doc, _, section, _) = build();
        doc.set_attr(section, "id", "main");
        assert_eq!(doc.attr(section, "id"), Some("main"));
        doc.set_attr(section, "id", "other");
        assert_eq!(doc.attr(section, "id"), Some("other"));
        doc.remove_attr(section, "id");
        assert_eq!(doc.attr(section, "id"), None);
    }

    #[test]
    fn test_merge_attrs_existing_wins() {
        let (mut doc, _, section, _) = build();
        doc.set_attr(section, "id", "x");
        doc.merge_attrs(section, &[Attr::new("id", "y"), Attr::new("title", "t")]);
        assert_eq!(doc.attr(section, "id"), Some("x"));
        assert_eq!(doc.attr(section, "title"), Some("t"));
    }

    #[test]
    fn test_merge_attrs_class_union() {
        let (mut doc, _, section, _) = build();
        doc.set_attr(section, "class", "a");
        doc.merge_attrs(section, &[Attr::new("class", "b a")]);
        assert_eq!(doc.attr(section, "class"), Some("a b"));
    }

    #[test]
    fn test_import_subtree() {
        let (source, _, section, _) = build();
        let mut target = Document::new();
        let root = target.create_element("div");
        let copy = target.import(&source, section);
        target.append_child(root, copy);
        assert_eq!(target.tag_name(copy), Some("section"));
        assert_eq!(target.text_content(copy), "caption");
    }

    #[test]
    fn test_descendant_elements_order() {
        let (mut doc, root, section, _) = build();
        let aside = doc.create_element("aside");
        doc.append_child(root, aside);
        assert_eq!(doc.descendant_elements(root), vec![root, section, aside]);
    }
}
