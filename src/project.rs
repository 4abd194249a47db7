//! Project context
//!
//! The project is the host surface consumed by the resolver: the source tree
//! root with filesystem primitives, the locale list, the media-query alias
//! table, the script class index and the operator naming strategy. All of it
//! is declared by the `weft.toml` descriptor at the project root, or built
//! programmatically when embedding.
//!
//! ```toml
//! name = "demo"
//! locales = ["en", "ro"]
//! operators = "data-attr"
//!
//! [[media-query]]
//! alias = "w1200"
//! expression = "max-width: 1200px"
//! weight = 1
//!
//! [[script]]
//! class = "app.Dialog"
//! file = "script/app/Dialog.js"
//! strong = ["app.Widget"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::operators::{OperatorsHandler, OperatorsNaming};
use crate::path::{FilePath, MediaQueryDefinition, Reference};

/// Project descriptor file name, expected at the project root.
pub const DESCRIPTOR_FILE: &str = "weft.toml";

/// Default project-global asset scope directory.
const DEFAULT_ASSET_DIR: &str = "res/asset";

/// Script index entry from the project descriptor: class name, physical file
/// and declared dependency classes. Strong dependencies load before the
/// script, weak dependencies may load after.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScriptEntry {
    pub class: String,
    pub file: String,
    #[serde(default)]
    pub strong: Vec<String>,
    #[serde(default)]
    pub weak: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct Descriptor {
    name: Option<String>,
    locales: Vec<String>,
    asset_dir: Option<String>,
    operators: OperatorsNaming,
    media_query: Vec<MediaQueryDescriptor>,
    script: Vec<ScriptEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct MediaQueryDescriptor {
    alias: String,
    expression: String,
    #[serde(default)]
    weight: i32,
}

/// Project context: source tree root plus descriptor data.
pub struct Project {
    root: PathBuf,
    name: Option<String>,
    /// Declared locales; the first one is the default.
    locales: Vec<String>,
    media_queries: Vec<MediaQueryDefinition>,
    scripts: Vec<ScriptEntry>,
    asset_dir: FilePath,
    operators: Box<dyn OperatorsHandler>,
}

impl Project {
    /// Create a project with defaults, for programmatic setup and tests.
    pub fn new(root: impl Into<PathBuf>) -> Project {
        Project {
            root: root.into(),
            name: None,
            locales: Vec::new(),
            media_queries: Vec::new(),
            scripts: Vec::new(),
            asset_dir: FilePath::parse(DEFAULT_ASSET_DIR, &[]).expect("default asset path is valid"),
            operators: OperatorsNaming::default().handler(),
        }
    }

    /// Open a project, reading the `weft.toml` descriptor when present. A
    /// missing descriptor yields the defaults.
    pub fn open(root: impl Into<PathBuf>) -> Result<Project> {
        let root = root.into();
        let descriptor_path = root.join(DESCRIPTOR_FILE);
        let descriptor = if descriptor_path.is_file() {
            let content = fs::read_to_string(&descriptor_path)
                .map_err(|e| Error::io(descriptor_path.display().to_string(), e))?;
            toml::from_str::<Descriptor>(&content)?
        } else {
            Descriptor::default()
        };

        let mut project = Project::new(root).with_operators(descriptor.operators);
        project.name = descriptor.name;
        project.locales = descriptor.locales;
        project.media_queries = descriptor
            .media_query
            .into_iter()
            .map(|q| MediaQueryDefinition::new(q.alias, q.expression, q.weight))
            .collect();
        project.scripts = descriptor.script;
        if let Some(asset_dir) = descriptor.asset_dir {
            project.asset_dir = FilePath::parse(&asset_dir, &[])?;
        }
        Ok(project)
    }

    pub fn with_locales(
        mut self,
        locales: impl IntoIterator<Item = impl Into<String>>,
    ) -> Project {
        self.locales = locales.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_media_query(mut self, definition: MediaQueryDefinition) -> Project {
        self.media_queries.push(definition);
        self
    }

    pub fn with_script(mut self, entry: ScriptEntry) -> Project {
        self.scripts.push(entry);
        self
    }

    pub fn with_operators(mut self, naming: OperatorsNaming) -> Project {
        self.operators = naming.handler();
        self
    }

    pub fn with_asset_dir(mut self, dir: &str) -> Result<Project> {
        self.asset_dir = FilePath::parse(dir, &[])?;
        Ok(self)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    /// Default locale, the first declared one.
    pub fn default_locale(&self) -> Option<&str> {
        self.locales.first().map(String::as_str)
    }

    pub fn media_queries(&self) -> &[MediaQueryDefinition] {
        &self.media_queries
    }

    pub fn media_query(&self, alias: &str) -> Option<&MediaQueryDefinition> {
        self.media_queries.iter().find(|q| q.alias == alias)
    }

    /// Script index lookup by class name.
    pub fn script(&self, class: &str) -> Option<&ScriptEntry> {
        self.scripts.iter().find(|s| s.class == class)
    }

    /// Operator naming strategy, selected once at configuration.
    pub fn operators(&self) -> &dyn OperatorsHandler {
        self.operators.as_ref()
    }

    /// Project-global asset scope, fallback for variables and media files.
    pub fn asset_dir(&self) -> &FilePath {
        &self.asset_dir
    }

    /// Parse a project-relative path against this project's alias table.
    pub fn file(&self, value: &str) -> Result<FilePath> {
        FilePath::parse(value, &self.media_queries)
    }

    /// Layout file of a component directory: by convention the component, its
    /// layout, style, script and descriptor files share the directory name.
    /// `res/compo/dialog` has layout `res/compo/dialog/dialog.htm`.
    pub fn component_layout(&self, component: &str) -> Result<FilePath> {
        let dir = self.file(component)?;
        if !dir.is_directory() {
            return Err(Error::InvalidPath {
                path: component.to_string(),
            });
        }
        dir.child(&format!("{}.htm", dir.basename()), &self.media_queries)
    }

    // ------------------------------------------------------------------
    // filesystem primitives

    /// Absolute filesystem path for a project-relative path.
    pub fn absolute(&self, path: &FilePath) -> PathBuf {
        if path.is_project_root() {
            return self.root.clone();
        }
        self.root.join(path.value().trim_end_matches('/'))
    }

    pub fn exists(&self, path: &FilePath) -> bool {
        self.absolute(path).exists()
    }

    /// Read a file's content; the handle is scoped to this call.
    pub fn read_to_string(&self, path: &FilePath) -> Result<String> {
        fs::read_to_string(self.absolute(path)).map_err(|e| Error::io(path.value(), e))
    }

    /// Direct child files of a directory, sorted by name for deterministic
    /// enumeration. Sub-directories and hidden files are excluded.
    pub fn children(&self, dir: &FilePath) -> Result<Vec<FilePath>> {
        let absolute = self.absolute(dir);
        if !absolute.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&absolute).map_err(|e| Error::io(dir.value(), e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(dir.value(), e))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            let file_type = entry.file_type().map_err(|e| Error::io(dir.value(), e))?;
            if !file_type.is_file() {
                continue;
            }
            files.push(dir.child(&name, &self.media_queries)?);
        }
        files.sort_by(|a, b| a.value().cmp(b.value()));
        Ok(files)
    }

    /// All directories of the project tree, the root included, hidden
    /// directories excluded.
    pub fn directories(&self) -> Result<Vec<FilePath>> {
        let mut directories = Vec::new();
        let mut pending = vec![FilePath::parse(".", &[])?];
        while let Some(dir) = pending.pop() {
            let absolute = self.absolute(&dir);
            let entries = fs::read_dir(&absolute).map_err(|e| Error::io(dir.value(), e))?;
            for entry in entries {
                let entry = entry.map_err(|e| Error::io(dir.value(), e))?;
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with('.') {
                    continue;
                }
                let file_type = entry.file_type().map_err(|e| Error::io(dir.value(), e))?;
                if file_type.is_dir() {
                    pending.push(dir.child(&format!("{}/", name), &self.media_queries)?);
                }
            }
            directories.push(dir);
        }
        Ok(directories)
    }

    /// Locate the media file a reference points to, searching the source
    /// file's directory first and the asset scope second. The reference
    /// sub-path selects a sub-directory; a file with the requested locale
    /// variant is preferred, falling back to the variant-less file.
    pub fn media_file(
        &self,
        locale: Option<&str>,
        reference: &Reference,
        source: &FilePath,
    ) -> Result<Option<FilePath>> {
        let mut scopes = Vec::new();
        if let Some(parent) = source.parent() {
            scopes.push(parent);
        }
        scopes.push(self.asset_dir.clone());

        for scope in scopes {
            let dir = match reference.path() {
                Some(sub_path) => scope.child(&format!("{}/", sub_path), &self.media_queries)?,
                None => scope,
            };
            let candidates: Vec<FilePath> = self
                .children(&dir)?
                .into_iter()
                .filter(|file| file.is_media() && file.has_basename(reference.name()))
                .collect();
            if locale.is_some() {
                if let Some(found) = candidates
                    .iter()
                    .find(|file| file.variants().has_locale(locale))
                {
                    return Ok(Some(found.clone()));
                }
            }
            if let Some(found) = candidates
                .iter()
                .find(|file| file.variants().has_locale(None))
            {
                return Ok(Some(found.clone()));
            }
        }
        Ok(None)
    }
}
