//! Widget composition: insertion, parameters, style and script aggregation.

mod common;

use pretty_assertions::assert_eq;

use common::{fixture_project, FixtureHandler};
use weft::dom::{Document, NodeId};
use weft::{Component, Error, VariablesCache};

fn resolve(component: &str) -> Result<Component, Error> {
    let project = fixture_project();
    let variables = VariablesCache::scan(&project).unwrap();
    let mut handler = FixtureHandler::new(&project, &variables);
    weft::resolve(&project, component, &mut handler)
}

fn find_class(doc: &Document, class: &str) -> Option<NodeId> {
    doc.descendant_elements(doc.root()).into_iter().find(|&id| {
        doc.attr(id, "class")
            .map(|value| value.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    })
}

#[test]
fn test_widget_inserted_into_marker() {
    let component = resolve("res/page/index").unwrap();
    let doc = component.layout();

    // the marker keeps its own attributes, merged with the widget root's
    let marker = find_class(doc, "wide").unwrap();
    assert_eq!(doc.attr(marker, "class"), Some("wide dialog"));
    assert_eq!(doc.attr(marker, "data-compo"), None);
    assert_eq!(doc.attr(marker, "data-param"), None);

    // the widget children replace the marker children
    let caption = find_class(doc, "caption").unwrap();
    assert_eq!(doc.tag_name(caption), Some("h2"));
    assert!(doc.text_content(marker).contains("Dialog body"));
}

#[test]
fn test_invocation_parameters_injected() {
    let component = resolve("res/page/index").unwrap();
    let doc = component.layout();
    let caption = find_class(doc, "caption").unwrap();
    assert_eq!(doc.text_content(caption), "Greetings");
}

#[test]
fn test_variables_substituted_in_page_scope() {
    let component = resolve("res/page/index").unwrap();
    let doc = component.layout();
    let h1 = doc
        .descendant_elements(doc.root())
        .into_iter()
        .find(|&id| doc.tag_name(id) == Some("h1"))
        .unwrap();
    assert_eq!(doc.text_content(h1), "Hello");
}

#[test]
fn test_style_order_dependencies_first() {
    let component = resolve("res/page/index").unwrap();
    let styles: Vec<&str> = component.styles().iter().map(|s| s.value()).collect();
    assert_eq!(
        styles,
        [
            "res/compo/dialog/dialog.css",
            "res/template/page/page.css",
            "res/page/index/index.css",
        ]
    );
}

#[test]
fn test_script_order_strong_before_self_before_weak() {
    let component = resolve("res/page/index").unwrap();
    let scripts: Vec<&str> = component.scripts().iter().map(|s| s.value()).collect();
    assert_eq!(
        scripts,
        [
            "script/app/Widget.js",
            "script/app/Dialog.js",
            "script/app/Tip.js",
        ]
    );
}

#[test]
fn test_descriptor_loaded() {
    let component = resolve("res/page/index").unwrap();
    let descriptor = component.descriptor().unwrap();
    assert_eq!(descriptor.display(), Some("Index Page"));
    assert_eq!(
        descriptor.description(),
        Some("Landing page of the demo project")
    );
}

#[test]
fn test_component_without_descriptor() {
    let component = resolve("res/page/about").unwrap();
    assert!(component.descriptor().is_none());
}

#[test]
fn test_self_including_widget_raises() {
    let result = resolve("res/compo/loop");
    assert!(matches!(result, Err(Error::CircularComposition { .. })));
}

#[test]
fn test_eight_nesting_levels_succeed() {
    let component = resolve("res/deep/d1").unwrap();
    let doc = component.layout();
    assert!(doc.text_content(doc.root()).contains("leaf"));
}

#[test]
fn test_broken_script_reference() {
    let result = resolve("res/page/badscript");
    assert!(matches!(
        result,
        Err(Error::BrokenScriptReference { class, .. }) if class == "app.Missing"
    ));
}
