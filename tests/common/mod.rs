//! Shared fixture project and reference handler for integration tests.

use weft::{
    Error, FilePath, Project, Reference, ReferenceHandler, ResolutionContext, Result,
    VariablesCache,
};

pub fn fixture_project() -> Project {
    Project::open(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/project"))
        .expect("fixture project descriptor")
}

/// Handler backed by the fixture project's variable stores; media references
/// resolve to project-relative paths.
pub struct FixtureHandler<'a> {
    pub project: &'a Project,
    pub variables: &'a VariablesCache,
    pub locale: Option<String>,
}

impl<'a> FixtureHandler<'a> {
    pub fn new(project: &'a Project, variables: &'a VariablesCache) -> Self {
        Self {
            project,
            variables,
            locale: project.default_locale().map(str::to_string),
        }
    }
}

impl ReferenceHandler for FixtureHandler<'_> {
    fn on_reference(
        &mut self,
        reference: &Reference,
        source: &FilePath,
        context: &mut ResolutionContext,
    ) -> Result<String> {
        let project = self.project;
        let variables = self.variables;
        let locale = self.locale.clone();

        if reference.is_variable() {
            return variables
                .resolve(project, locale.as_deref(), reference, source, self, context)?
                .ok_or_else(|| Error::UnresolvedReference {
                    path: source.value().to_string(),
                    reference: reference.to_string(),
                });
        }
        if reference.is_media_file() {
            return project
                .media_file(locale.as_deref(), reference, source)?
                .map(|file| format!("/{}", file.value()))
                .ok_or_else(|| Error::UnresolvedReference {
                    path: source.value().to_string(),
                    reference: reference.to_string(),
                });
        }
        Err(Error::UnresolvedReference {
            path: source.value().to_string(),
            reference: reference.to_string(),
        })
    }
}
