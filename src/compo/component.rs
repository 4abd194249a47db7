//! Component resolution engine
//!
//! A component is a piece of user interface designed to interconnect with
//! other components through two relations: inheritance, implemented by the
//! templates mechanism, and composition, implemented by widget inclusion.
//! This module discovers the relations and consolidates one component
//! aggregate: the fully resolved layout plus ordered style and script file
//! lists.
//!
//! Layout files are read through the substitution reader, so by the time a
//! document is parsed all at-meta references are already replaced - variables
//! injected and resource references mapped by the external handler.

use log::debug;

use crate::compo::descriptor::ComponentDescriptor;
use crate::compo::params::LayoutParameters;
use crate::compo::scripts::collect_scripts;
use crate::dom::{parse_document, Attr, Document, NodeId};
use crate::error::{Error, Result};
use crate::handler::{ReferenceHandler, ResolutionContext};
use crate::operators::Operator;
use crate::path::{FileKind, FilePath};
use crate::project::Project;
use crate::reader::{CharRead, SourceReader};

/// Depth guard for template and widget recursion. Components nested deeper
/// are assumed to reference themselves.
const MAX_NESTING_DEPTH: usize = 8;

/// Resolved component aggregate: consolidated layout, ordered style and
/// script lists and the optional descriptor. Built once, immutable after.
pub struct Component {
    name: String,
    layout_path: FilePath,
    layout: Document,
    styles: Vec<FilePath>,
    scripts: Vec<FilePath>,
    descriptor: Option<ComponentDescriptor>,
}

impl Component {
    /// Resolve the component identified by its layout file path. Templates
    /// and widgets are consolidated depth-first; the reference handler is
    /// invoked for every reference discovered while reading the involved
    /// source files.
    pub fn resolve(
        project: &Project,
        layout_path: &FilePath,
        handler: &mut dyn ReferenceHandler,
    ) -> Result<Component> {
        if !project.exists(layout_path) {
            return Err(Error::MissingLayout {
                path: layout_path.value().to_string(),
                parent: ".".to_string(),
            });
        }
        debug!("resolve component {}", layout_path);

        let mut resolver = Resolver {
            project,
            handler,
            context: ResolutionContext::new(),
            parameters: LayoutParameters::new(),
            styles: Vec::new(),
            script_classes: Vec::new(),
        };
        let mut layout = resolver.scan_components_tree(layout_path, 0)?;
        resolver.clean(&mut layout);

        let Resolver {
            handler,
            mut context,
            mut styles,
            script_classes,
            ..
        } = resolver;

        let descriptor = ComponentDescriptor::load(
            project,
            &layout_path.related(FileKind::Xml),
            handler,
            &mut context,
        )?;

        let scripts = collect_scripts(project, layout_path, &script_classes)?;
        // scripts may have style siblings too; dependency styles go first
        for script in &scripts {
            let style = script.related(FileKind::Style);
            if project.exists(&style) && !styles.contains(&style) {
                styles.insert(0, style);
            }
        }

        Ok(Component {
            name: layout_path.basename().to_string(),
            layout_path: layout_path.clone(),
            layout,
            styles,
            scripts,
            descriptor,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout_path(&self) -> &FilePath {
        &self.layout_path
    }

    /// Consolidated layout document.
    pub fn layout(&self) -> &Document {
        &self.layout
    }

    /// Style files in page inclusion order, dependency styles first.
    pub fn styles(&self) -> &[FilePath] {
        &self.styles
    }

    /// Script files in load order, strong dependencies before the scripts
    /// requiring them.
    pub fn scripts(&self) -> &[FilePath] {
        &self.scripts
    }

    pub fn descriptor(&self) -> Option<&ComponentDescriptor> {
        self.descriptor.as_ref()
    }
}

/// Per-resolution state: the reference handler, the variable cycle trace, the
/// parameter scope for the current invocation and the accumulating style and
/// script collections.
struct Resolver<'a> {
    project: &'a Project,
    handler: &'a mut dyn ReferenceHandler,
    context: ResolutionContext,
    parameters: LayoutParameters,
    styles: Vec<FilePath>,
    script_classes: Vec<String>,
}

impl Resolver<'_> {
    /// Composition pass: resolve the layout's template hierarchy, then insert
    /// widget components depth-first. Widgets may include other widgets,
    /// building an unrestricted tree; the depth guard breaks reference
    /// cycles.
    fn scan_components_tree(&mut self, layout_path: &FilePath, depth: usize) -> Result<Document> {
        if depth == MAX_NESTING_DEPTH {
            return Err(Error::CircularComposition {
                path: layout_path.value().to_string(),
            });
        }

        // template nesting is guarded independently, the counter restarts
        let mut doc = self.load_layout(layout_path, 0)?;
        let ops = self.project.operators();

        // the marker element is the insertion point: it keeps its own
        // attributes, merged with the widget root's, and receives the widget
        // root's children
        for marker in ops.find_by_operator(&doc, doc.root(), Operator::Compo) {
            if !doc.contains(marker) {
                // removed with the children of an outer widget marker
                continue;
            }
            let operand = ops
                .operand(&doc, marker, Operator::Compo)
                .expect("marker found by operator");
            let child_path = self.project.component_layout(&operand)?;
            if !self.project.exists(&child_path) {
                return Err(Error::MissingLayout {
                    path: child_path.value().to_string(),
                    parent: layout_path.value().to_string(),
                });
            }
            debug!("insert widget {} into {}", child_path, layout_path);

            self.parameters
                .reload(ops.operand(&doc, marker, Operator::Param).as_deref());
            ops.remove_operator(&mut doc, marker, Operator::Param);

            let widget = self.scan_components_tree(&child_path, depth + 1)?;
            let widget_root = widget.root();

            let attrs = element_attrs(&widget, widget_root);
            doc.merge_attrs(marker, &attrs);
            doc.remove_children(marker);
            for &child in widget.children(widget_root) {
                let copy = doc.import(&widget, child);
                doc.append_child(marker, copy);
            }
            ops.remove_operator(&mut doc, marker, Operator::Compo);
        }

        Ok(doc)
    }

    /// Template pass: load a layout document, resolving its template
    /// hierarchy when the layout declares content fragments. Returns the
    /// template document with content injected when the fragment is the
    /// layout root, the layout itself otherwise.
    fn load_layout(&mut self, layout_path: &FilePath, depth: usize) -> Result<Document> {
        if depth == MAX_NESTING_DEPTH {
            return Err(Error::CircularComposition {
                path: layout_path.value().to_string(),
            });
        }

        let mut content = String::new();
        SourceReader::with_parameters(
            self.project,
            layout_path,
            &self.parameters,
            &mut *self.handler,
            &mut self.context,
        )?
        .read_to_string(&mut content)?;
        let mut doc = parse_document(&content).map_err(|e| Error::InvalidDocument {
            path: layout_path.value().to_string(),
            message: e.to_string(),
        })?;

        self.collect_related_style(layout_path);
        self.collect_script_classes(&doc, layout_path)?;

        let ops = self.project.operators();
        let fragments = ops.find_by_operator(&doc, doc.root(), Operator::Template);
        if fragments.is_empty() {
            // no content fragments, the layout does not inherit a template
            return Ok(doc);
        }

        if fragments[0] == doc.root() {
            // the whole layout is content for a template
            return self.consolidate_template(layout_path, &doc, doc.root(), depth + 1);
        }

        // inline content fragments are replaced by their consolidated
        // template documents
        for fragment in fragments {
            if !doc.contains(fragment) {
                continue;
            }
            let template_doc = self.consolidate_template(layout_path, &doc, fragment, depth + 1)?;
            let replacement = doc.import(&template_doc, template_doc.root());
            doc.insert_before(fragment, replacement);
            doc.remove(fragment);
        }
        Ok(doc)
    }

    /// Resolve the template a content fragment declares and fill its editable
    /// areas with the fragment's content elements.
    fn consolidate_template(
        &mut self,
        layout_path: &FilePath,
        src_doc: &Document,
        fragment: NodeId,
        depth: usize,
    ) -> Result<Document> {
        let ops = self.project.operators();
        let operand = ops
            .operand(src_doc, fragment, Operator::Template)
            .expect("fragment found by operator");

        // single-content fragments may pack the editable name into the
        // template operand, TEMPLATE_PATH#EDITABLE_NAME
        let (template_operand, fragment_editable) = match operand.split_once('#') {
            Some((path, editable)) => (path, Some(editable.to_string())),
            None => (operand.as_str(), None),
        };
        let template_path = self.project.component_layout(template_operand)?;
        if !self.project.exists(&template_path) {
            return Err(Error::MissingLayout {
                path: template_path.value().to_string(),
                parent: layout_path.value().to_string(),
            });
        }
        debug!("consolidate template {} for {}", template_path, layout_path);

        let mut content_elements = ops.find_by_operator(src_doc, fragment, Operator::Content);
        if content_elements.is_empty() {
            content_elements.push(fragment);
        }

        // invocation parameters ride on the first content element; the
        // template is loaded with them active
        self.parameters
            .reload(ops.operand(src_doc, content_elements[0], Operator::Param).as_deref());
        let mut template_doc = self.load_layout(&template_path, depth)?;

        for content in content_elements {
            let editable_name = ops
                .operand(src_doc, content, Operator::Content)
                .or_else(|| fragment_editable.clone())
                .ok_or_else(|| Error::InvalidDocument {
                    path: layout_path.value().to_string(),
                    message: "content element without editable name".to_string(),
                })?;
            let editable = ops
                .get_by_operator(&template_doc, template_doc.root(), Operator::Editable, &editable_name)
                .ok_or_else(|| Error::MissingEditable {
                    path: layout_path.value().to_string(),
                    template: template_path.value().to_string(),
                    name: editable_name.clone(),
                })?;
            ops.remove_operator(&mut template_doc, editable, Operator::Editable);

            let copy = template_doc.import(src_doc, content);
            ops.remove_operator(&mut template_doc, copy, Operator::Template);
            ops.remove_operator(&mut template_doc, copy, Operator::Content);
            ops.remove_operator(&mut template_doc, copy, Operator::Param);

            if template_doc.parent(editable).is_none() {
                // the editable is the template root: content children move
                // into it and content attributes take precedence
                let content_attrs = element_attrs(&template_doc, copy);
                overwrite_attrs(&mut template_doc, editable, &content_attrs);
                for child in template_doc.children(copy).to_vec() {
                    template_doc.detach(child);
                    template_doc.append_child(editable, child);
                }
                template_doc.remove(copy);
            } else {
                // replace the editable with the content element, content
                // attributes win, classes union
                let editable_attrs = element_attrs(&template_doc, editable);
                template_doc.insert_before(editable, copy);
                template_doc.merge_attrs(copy, &editable_attrs);
                template_doc.remove(editable);
            }
        }

        Ok(template_doc)
    }

    /// A layout or script file may have a style sibling with the same base
    /// name. Styles are linked into the page head in list order, first on
    /// top; every discovery is prepended so that template, widget and script
    /// styles land before the styles of the component requiring them.
    fn collect_related_style(&mut self, source_file: &FilePath) {
        let style = source_file.related(FileKind::Style);
        if self.project.exists(&style) && !self.styles.contains(&style) {
            self.styles.insert(0, style);
        }
    }

    /// Collect script classes bound by the class operator. Classes must be
    /// present in the project script index; order of first discovery is kept.
    fn collect_script_classes(&mut self, doc: &Document, layout_path: &FilePath) -> Result<()> {
        let ops = self.project.operators();
        for element in ops.find_by_operator(doc, doc.root(), Operator::Class) {
            let class = ops
                .operand(doc, element, Operator::Class)
                .expect("element found by operator");
            if self.project.script(&class).is_none() {
                return Err(Error::BrokenScriptReference {
                    path: layout_path.value().to_string(),
                    class,
                });
            }
            if !self.script_classes.contains(&class) {
                self.script_classes.push(class);
            }
        }
        Ok(())
    }

    /// Post-resolution cleanup: template realization is optional, so unfilled
    /// editables may remain - empty ones are removed, non-empty ones only
    /// lose the operator. The operator namespace declaration, when the naming
    /// strategy uses one, is dropped from the root.
    fn clean(&mut self, doc: &mut Document) {
        let ops = self.project.operators();
        for editable in ops.find_by_operator(doc, doc.root(), Operator::Editable) {
            if doc.children(editable).is_empty() {
                doc.remove(editable);
            } else {
                ops.remove_operator(doc, editable, Operator::Editable);
            }
        }
        if let Some(declaration) = ops.namespace_declaration() {
            doc.remove_attr(doc.root(), declaration);
        }
    }
}

fn element_attrs(doc: &Document, id: NodeId) -> Vec<Attr> {
    doc.element(id).map(|e| e.attrs.clone()).unwrap_or_default()
}

/// Set attributes overwriting existing values; classes union, incoming
/// classes first.
fn overwrite_attrs(doc: &mut Document, target: NodeId, attrs: &[Attr]) {
    for attr in attrs {
        if attr.name == "class" {
            let existing = doc.attr(target, "class").unwrap_or_default().to_string();
            doc.remove_attr(target, "class");
            doc.set_attr(target, "class", &attr.value);
            doc.merge_attrs(target, &[Attr::new("class", existing)]);
        } else {
            doc.set_attr(target, &attr.name, &attr.value);
        }
    }
}
