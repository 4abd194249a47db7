//! Weft CLI
//!
//! Resolves a component and prints the consolidated document to stdout:
//!
//! ```text
//! weft res/page/index --project demo --locale ro
//! ```
//!
//! The binary hosts a preview-flavored reference handler: variables come from
//! the project's own variable stores with asset fallback, media references
//! map to project-relative paths.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use weft::{
    Error, FilePath, Project, Reference, ReferenceHandler, ReferenceType, ResolutionContext,
    Result, VariablesCache,
};
use weft::{CharRead, SourceReader, StyleReader};

#[derive(Parser)]
#[command(name = "weft")]
#[command(about = "Declarative UI component compiler")]
struct Cli {
    /// Component directory or layout file, project-relative
    component: String,

    /// Project root directory
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Locale used for variable and media resolution; defaults to the
    /// project's first declared locale
    #[arg(short, long)]
    locale: Option<String>,

    /// Print the consolidated style sheets after the document
    #[arg(long)]
    styles: bool,

    /// Print the script file list after the document
    #[arg(long)]
    scripts: bool,
}

/// Preview-flavored handler: variables from the project stores, resource
/// files as project-relative paths.
struct PreviewHandler<'a> {
    project: &'a Project,
    variables: &'a VariablesCache,
    locale: Option<String>,
}

impl ReferenceHandler for PreviewHandler<'_> {
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
                .ok_or_else(|| unresolved(reference, source));
        }

        match reference.reference_type() {
            ReferenceType::Image
            | ReferenceType::Audio
            | ReferenceType::Video
            | ReferenceType::Font
            | ReferenceType::File => project
                .media_file(locale.as_deref(), reference, source)?
                .map(|file| format!("/{}", file.value()))
                .ok_or_else(|| unresolved(reference, source)),
            ReferenceType::Project => match reference.name() {
                "name" => project
                    .name()
                    .map(str::to_string)
                    .ok_or_else(|| unresolved(reference, source)),
                _ => Err(unresolved(reference, source)),
            },
            _ => Err(unresolved(reference, source)),
        }
    }
}

fn unresolved(reference: &Reference, source: &FilePath) -> Error {
    Error::UnresolvedReference {
        path: source.value().to_string(),
        reference: reference.to_string(),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let project = Project::open(cli.project.clone())?;
    let variables = VariablesCache::scan(&project)?;
    let locale = cli
        .locale
        .clone()
        .or_else(|| project.default_locale().map(str::to_string));

    let mut handler = PreviewHandler {
        project: &project,
        variables: &variables,
        locale,
    };
    let component = weft::resolve(&project, &cli.component, &mut handler)?;

    println!("{}", component.layout().to_xml());

    if cli.styles {
        // variant composition stacked beneath reference substitution
        for style in component.styles() {
            let mut content = String::new();
            let mut context = ResolutionContext::new();
            let base = StyleReader::new(&project, style)?;
            let mut reader =
                SourceReader::from_reader(Box::new(base), style, &mut handler, &mut context);
            reader.read_to_string(&mut content)?;
            println!("/* {} */", style);
            println!("{}", content);
        }
    }

    if cli.scripts {
        for script in component.scripts() {
            println!("{}", script);
        }
    }

    Ok(())
}
