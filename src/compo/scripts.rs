//! Script dependency ordering
//!
//! Script files are declared in the project descriptor, each entry binding a
//! class name to a physical file plus its strong and weak dependency classes.
//! Strong dependencies are needed while the script loads and must come before
//! it; weak dependencies are runtime-only and may come after. Emission walks
//! dependencies recursively, strong first, then the script itself, then weak,
//! each file exactly once at first visit.

use crate::error::{Error, Result};
use crate::path::FilePath;
use crate::project::{Project, ScriptEntry};

/// Resolve the requested classes into an ordered script file list.
pub fn collect_scripts(
    project: &Project,
    source: &FilePath,
    classes: &[String],
) -> Result<Vec<FilePath>> {
    let mut scripts = Vec::new();
    let mut visiting = Vec::new();
    for class in classes {
        let entry = lookup(project, source, class)?;
        add_script(project, entry, &mut scripts, &mut visiting)?;
    }
    Ok(scripts)
}

fn lookup<'p>(project: &'p Project, source: &FilePath, class: &str) -> Result<&'p ScriptEntry> {
    project
        .script(class)
        .ok_or_else(|| Error::BrokenScriptReference {
            path: source.value().to_string(),
            class: class.to_string(),
        })
}

fn add_script(
    project: &Project,
    entry: &ScriptEntry,
    target: &mut Vec<FilePath>,
    visiting: &mut Vec<String>,
) -> Result<()> {
    if visiting.contains(&entry.class) {
        // dependency cycle; first visit already decides the position
        return Ok(());
    }
    visiting.push(entry.class.clone());

    let file = project.file(&entry.file)?;
    for dependency in &entry.strong {
        let dependency = lookup(project, &file, dependency)?;
        add_script(project, dependency, target, visiting)?;
    }
    if !target.contains(&file) {
        target.push(file.clone());
    }
    for dependency in &entry.weak {
        let dependency = lookup(project, &file, dependency)?;
        add_script(project, dependency, target, visiting)?;
    }

    visiting.pop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(class: &str, file: &str, strong: &[&str], weak: &[&str]) -> ScriptEntry {
        ScriptEntry {
            class: class.to_string(),
            file: file.to_string(),
            strong: strong.iter().map(|s| s.to_string()).collect(),
            weak: weak.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn project(entries: Vec<ScriptEntry>) -> Project {
        let mut project = Project::new("/tmp/none");
        for script in entries {
            project = project.with_script(script);
        }
        project
    }

    fn source() -> FilePath {
        FilePath::parse("res/page/index/index.htm", &[]).unwrap()
    }

    fn values(scripts: &[FilePath]) -> Vec<&str> {
        scripts.iter().map(FilePath::value).collect()
    }

    #[test]
    fn test_strong_before_self_before_weak() {
        let project = project(vec![
            entry("app.Page", "script/Page.js", &["app.Widget"], &["app.Tip"]),
            entry("app.Widget", "script/Widget.js", &[], &[]),
            entry("app.Tip", "script/Tip.js", &[], &[]),
        ]);
        let scripts = collect_scripts(&project, &source(), &["app.Page".to_string()]).unwrap();
        assert_eq!(
            values(&scripts),
            ["script/Widget.js", "script/Page.js", "script/Tip.js"]
        );
    }

    #[test]
    fn test_shared_dependency_emitted_once() {
        let project = project(vec![
            entry("app.A", "script/A.js", &["app.Base"], &[]),
            entry("app.B", "script/B.js", &["app.Base"], &[]),
            entry("app.Base", "script/Base.js", &[], &[]),
        ]);
        let scripts = collect_scripts(
            &project,
            &source(),
            &["app.A".to_string(), "app.B".to_string()],
        )
        .unwrap();
        assert_eq!(
            values(&scripts),
            ["script/Base.js", "script/A.js", "script/B.js"]
        );
    }

    #[test]
    fn test_transitive_strong_chain() {
        let project = project(vec![
            entry("app.Top", "script/Top.js", &["app.Mid"], &[]),
            entry("app.Mid", "script/Mid.js", &["app.Low"], &[]),
            entry("app.Low", "script/Low.js", &[], &[]),
        ]);
        let scripts = collect_scripts(&project, &source(), &["app.Top".to_string()]).unwrap();
        assert_eq!(
            values(&scripts),
            ["script/Low.js", "script/Mid.js", "script/Top.js"]
        );
    }

    #[test]
    fn test_broken_reference() {
        let project = project(vec![entry("app.A", "script/A.js", &["app.Gone"], &[])]);
        let result = collect_scripts(&project, &source(), &["app.A".to_string()]);
        assert!(matches!(
            result,
            Err(Error::BrokenScriptReference { class, .. }) if class == "app.Gone"
        ));
    }

    #[test]
    fn test_dependency_cycle_terminates() {
        let project = project(vec![
            entry("app.A", "script/A.js", &["app.B"], &[]),
            entry("app.B", "script/B.js", &["app.A"], &[]),
        ]);
        let scripts = collect_scripts(&project, &source(), &["app.A".to_string()]).unwrap();
        assert_eq!(values(&scripts), ["script/B.js", "script/A.js"]);
    }
}
