//! Localized variable store
//!
//! Variables are name/value pairs referenced from source files. A variable
//! belongs to a type - to fully refer one, both type and name are needed, see
//! [`Reference`]. Values are kept per locale; resources without a locale
//! variant land in the default bucket, consulted whenever a localized lookup
//! misses.
//!
//! A variables definition file is an XML file whose root element is a
//! variable type token and whose direct children are the reference names:
//!
//! ```text
//! <string>
//!     <title>Hello</title>
//! </string>
//! ```
//!
//! Values may nest references to other variables, forming a tree resolved
//! depth-first while reading; resolution re-enters the reference handler and
//! is guarded against cycles by the [`ResolutionContext`] trace.

use std::collections::HashMap;

use log::debug;

use crate::dom::parse_document;
use crate::error::{Error, Result};
use crate::handler::{ReferenceHandler, ResolutionContext};
use crate::path::{FilePath, Reference, ReferenceType};
use crate::project::Project;
use crate::reader::{CharRead, SourceReader};

/// Per-directory variable values bucketed by locale. The `None` bucket holds
/// values from files without a locale variant and doubles as the default
/// locale fallback.
#[derive(Debug, Default)]
pub struct Variables {
    values: HashMap<Option<String>, HashMap<Reference, String>>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store loaded from the variables definition files of a
    /// directory. A missing directory yields an empty store.
    pub fn load(project: &Project, dir: &FilePath) -> Result<Self> {
        let mut variables = Self::new();
        variables.load_dir(project, dir)?;
        Ok(variables)
    }

    /// Clear this store and rescan the directory.
    pub fn reload(&mut self, project: &Project, dir: &FilePath) -> Result<()> {
        self.values.clear();
        self.load_dir(project, dir)
    }

    fn load_dir(&mut self, project: &Project, dir: &FilePath) -> Result<()> {
        if !project.exists(dir) {
            return Ok(());
        }
        for file in project.children(dir)? {
            if file.is_variables() {
                self.load_file(project, &file)?;
            }
        }
        Ok(())
    }

    /// Load one definition file. A file whose root element is not a variable
    /// type token is not a variables file and is silently skipped; any other
    /// malformed content is fatal.
    fn load_file(&mut self, project: &Project, file: &FilePath) -> Result<()> {
        let content = project.read_to_string(file)?;
        let doc = parse_document(&content).map_err(|e| Error::InvalidDocument {
            path: file.value().to_string(),
            message: e.to_string(),
        })?;

        let root = doc.root();
        let root_name = doc.tag_name(root).unwrap_or_default().to_string();
        let reference_type = ReferenceType::from_token(&root_name);
        if !reference_type.is_variable() {
            return Ok(());
        }
        debug!("load variables file {}", file);

        let locale = file.variants().locale().map(str::to_string);
        let bucket = self.values.entry(locale).or_default();

        for entry in doc.child_elements(root) {
            let name = doc.tag_name(entry).unwrap_or_default().to_string();
            let value = if reference_type == ReferenceType::Text {
                // text variables are HTML fragments, keep nested markup
                doc.children(entry)
                    .iter()
                    .map(|&child| doc.node_to_xml(child))
                    .collect::<String>()
            } else {
                if !doc.child_elements(entry).is_empty() {
                    return Err(Error::InvalidDocument {
                        path: file.value().to_string(),
                        message: format!(
                            "nested element in '{}'; only text variables support nested elements",
                            name
                        ),
                    });
                }
                doc.text_content(entry)
            };
            bucket.insert(Reference::new(file.value(), reference_type, &name)?, value);
        }
        Ok(())
    }

    /// Raw value lookup: requested locale bucket first, default bucket on
    /// miss. No nested reference processing.
    fn lookup(&self, locale: Option<&str>, reference: &Reference) -> Option<&str> {
        let localized = locale.and_then(|l| {
            self.values
                .get(&Some(l.to_string()))
                .and_then(|bucket| bucket.get(reference))
        });
        localized
            .or_else(|| {
                self.values
                    .get(&None)
                    .and_then(|bucket| bucket.get(reference))
            })
            .map(String::as_str)
    }

    /// Get a variable value with nested references resolved. Returns
    /// `Ok(None)` when the variable is not defined or its value is empty.
    ///
    /// Nested resolution re-reads the found value through the substitution
    /// reader, which delegates discovered references back to the handler;
    /// the handler normally calls this method again for variables, walking
    /// the value tree depth-first. The context trace guards that loop: a
    /// revisited (source, reference) pair raises `CircularReference`, and
    /// the marker is popped on every exit path.
    pub fn resolve(
        &self,
        locale: Option<&str>,
        reference: &Reference,
        source: &FilePath,
        handler: &mut dyn ReferenceHandler,
        context: &mut ResolutionContext,
    ) -> Result<Option<String>> {
        let Some(value) = self.lookup(locale, reference) else {
            return Ok(None);
        };
        if value.is_empty() {
            return Ok(None);
        }

        let marker = ResolutionContext::marker(source, reference);
        if context.is_resolving(&marker) {
            return Err(context.circular_error(&marker));
        }
        context.start_resolving(marker);
        let resolved = resolve_nested(value, source, handler, context);
        context.done_resolving();
        resolved.map(Some)
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(HashMap::is_empty)
    }
}

/// Resolve references nested inside a variable value.
fn resolve_nested(
    value: &str,
    source: &FilePath,
    handler: &mut dyn ReferenceHandler,
    context: &mut ResolutionContext,
) -> Result<String> {
    let mut reader = SourceReader::from_value(value, source, handler, context);
    let mut resolved = String::new();
    reader.read_to_string(&mut resolved)?;
    Ok(resolved)
}

/// Variable stores for all project directories plus the global asset scope.
/// Lookup falls back local directory first, asset scope second; reference
/// handlers are the usual consumers.
#[derive(Debug, Default)]
pub struct VariablesCache {
    stores: HashMap<String, Variables>,
}

impl VariablesCache {
    /// Scan the whole project tree, loading a store for every directory that
    /// holds variables definition files.
    pub fn scan(project: &Project) -> Result<Self> {
        let mut stores = HashMap::new();
        for dir in project.directories()? {
            let has_variables = project
                .children(&dir)?
                .iter()
                .any(|file| file.is_variables());
            if has_variables {
                stores.insert(dir.value().to_string(), Variables::load(project, &dir)?);
            }
        }
        Ok(Self { stores })
    }

    pub fn get(&self, dir: &str) -> Option<&Variables> {
        self.stores.get(dir)
    }

    /// Resolve a variable reference against the source file's directory,
    /// falling back to the project asset scope.
    pub fn resolve(
        &self,
        project: &Project,
        locale: Option<&str>,
        reference: &Reference,
        source: &FilePath,
        handler: &mut dyn ReferenceHandler,
        context: &mut ResolutionContext,
    ) -> Result<Option<String>> {
        if let Some(parent) = source.parent() {
            if let Some(variables) = self.get(parent.value()) {
                if let Some(value) =
                    variables.resolve(locale, reference, source, handler, context)?
                {
                    return Ok(Some(value));
                }
            }
        }
        if let Some(variables) = self.get(project.asset_dir().value()) {
            return variables.resolve(locale, reference, source, handler, context);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::MediaQueryDefinition;

    fn fixture_project() -> Project {
        Project::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/project"))
            .with_locales(["en", "ro"])
            .with_media_query(MediaQueryDefinition::new("w1200", "max-width: 1200px", 1))
            .with_media_query(MediaQueryDefinition::new("w800", "max-width: 800px", 2))
    }

    /// Handler resolving variables from a single store, the way build and
    /// preview handlers do.
    struct StoreHandler<'s> {
        variables: &'s Variables,
        locale: Option<&'s str>,
    }

    impl ReferenceHandler for StoreHandler<'_> {
        fn on_reference(
            &mut self,
            reference: &Reference,
            source: &FilePath,
            context: &mut ResolutionContext,
        ) -> Result<String> {
            let variables = self.variables;
            variables
                .resolve(self.locale, reference, source, handler_of(self), context)?
                .ok_or_else(|| Error::UnresolvedReference {
                    path: source.value().to_string(),
                    reference: reference.to_string(),
                })
        }
    }

    /// Reborrow helper keeping the trait-object coercion in one place.
    fn handler_of<'h>(handler: &'h mut StoreHandler<'_>) -> &'h mut dyn ReferenceHandler {
        handler
    }

    fn reference(text: &str) -> Reference {
        Reference::parse(text).unwrap().unwrap()
    }

    fn source_file(project: &Project, value: &str) -> FilePath {
        project.file(value).unwrap()
    }

    #[test]
    fn test_load_and_lookup() {
        let project = fixture_project();
        let dir = project.file("res/page/index/").unwrap();
        let variables = Variables::load(&project, &dir).unwrap();
        assert_eq!(
            variables.lookup(None, &reference("@string/title")),
            Some("Hello")
        );
    }

    #[test]
    fn test_locale_fallback_to_default() {
        let project = fixture_project();
        let dir = project.file("res/page/index/").unwrap();
        let variables = Variables::load(&project, &dir).unwrap();
        let source = source_file(&project, "res/page/index/index.htm");
        let mut context = ResolutionContext::new();

        // declared without locale qualifier, identical for en and ro lookups
        for locale in [Some("en"), Some("ro")] {
            let mut handler = StoreHandler {
                variables: &variables,
                locale,
            };
            let value = variables
                .resolve(locale, &reference("@string/title"), &source, &mut handler, &mut context)
                .unwrap();
            assert_eq!(value.as_deref(), Some("Hello"));
        }
    }

    #[test]
    fn test_localized_value_wins() {
        let project = fixture_project();
        let dir = project.file("res/asset/").unwrap();
        let variables = Variables::load(&project, &dir).unwrap();
        let source = source_file(&project, "res/page/index/index.htm");
        let mut context = ResolutionContext::new();

        let mut handler = StoreHandler {
            variables: &variables,
            locale: Some("ro"),
        };
        let value = variables
            .resolve(Some("ro"), &reference("@string/app-name"), &source, &mut handler, &mut context)
            .unwrap();
        assert_eq!(value.as_deref(), Some("Aplicatia"));

        let mut handler = StoreHandler {
            variables: &variables,
            locale: None,
        };
        let value = variables
            .resolve(None, &reference("@string/app-name"), &source, &mut handler, &mut context)
            .unwrap();
        assert_eq!(value.as_deref(), Some("Application"));
    }

    #[test]
    fn test_missing_variable_is_none() {
        let project = fixture_project();
        let dir = project.file("res/page/index/").unwrap();
        let variables = Variables::load(&project, &dir).unwrap();
        let source = source_file(&project, "res/page/index/index.htm");
        let mut handler = StoreHandler {
            variables: &variables,
            locale: None,
        };
        let mut context = ResolutionContext::new();
        let value = variables
            .resolve(None, &reference("@string/absent"), &source, &mut handler, &mut context)
            .unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_nested_reference_resolution() {
        let project = fixture_project();
        let dir = project.file("res/asset/").unwrap();
        let variables = Variables::load(&project, &dir).unwrap();
        let source = source_file(&project, "res/page/index/index.htm");
        let mut handler = StoreHandler {
            variables: &variables,
            locale: None,
        };
        let mut context = ResolutionContext::new();
        let value = variables
            .resolve(None, &reference("@string/greeting"), &source, &mut handler, &mut context)
            .unwrap();
        assert_eq!(value.as_deref(), Some("Welcome to Application"));
        assert_eq!(context.depth(), 0);
    }

    #[test]
    fn test_circular_references_detected() {
        let project = fixture_project();
        let dir = project.file("res/cycle/").unwrap();
        let variables = Variables::load(&project, &dir).unwrap();
        let source = source_file(&project, "res/cycle/strings.xml");
        let mut handler = StoreHandler {
            variables: &variables,
            locale: None,
        };
        let mut context = ResolutionContext::new();
        let result = variables.resolve(
            None,
            &reference("@string/first"),
            &source,
            &mut handler,
            &mut context,
        );
        assert!(matches!(result, Err(Error::CircularReference { .. })));
        // trace unwinds even on error
        assert_eq!(context.depth(), 0);
    }

    #[test]
    fn test_self_reference_detected() {
        let project = fixture_project();
        let dir = project.file("res/cycle/").unwrap();
        let variables = Variables::load(&project, &dir).unwrap();
        let source = source_file(&project, "res/cycle/strings.xml");
        let mut handler = StoreHandler {
            variables: &variables,
            locale: None,
        };
        let mut context = ResolutionContext::new();
        let result = variables.resolve(
            None,
            &reference("@string/selfish"),
            &source,
            &mut handler,
            &mut context,
        );
        assert!(matches!(result, Err(Error::CircularReference { .. })));
    }

    #[test]
    fn test_text_variable_keeps_markup() {
        let project = fixture_project();
        let dir = project.file("res/page/index/").unwrap();
        let variables = Variables::load(&project, &dir).unwrap();
        assert_eq!(
            variables.lookup(None, &reference("@text/promo")),
            Some("New <b>major</b> release")
        );
    }

    #[test]
    fn test_non_variables_xml_skipped() {
        let project = fixture_project();
        // component descriptors live in the same directories and are ignored
        let dir = project.file("res/page/index/").unwrap();
        let variables = Variables::load(&project, &dir).unwrap();
        assert!(!variables.is_empty());
    }

    #[test]
    fn test_cache_local_then_asset() {
        let project = fixture_project();
        let cache = VariablesCache::scan(&project).unwrap();
        assert!(cache.get("res/page/index/").is_some());
        assert!(cache.get("res/asset/").is_some());
    }
}
