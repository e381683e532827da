//! `stratum init`: create the project file and the base layout.

use std::path::Path;

use tracing::{debug, instrument};

use stratum_adapters::{LocalFilesystem, ProjectFile};
use stratum_core::application::ExecuteRequest;
use stratum_core::application::ports::ProjectConfig;
use stratum_core::domain::Operation;

use crate::{
    cli::{GlobalArgs, InitArgs},
    commands::{parse_project_version, plugin_flags, run_scaffold},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

const DEFAULT_DOMAIN: &str = "my.domain";

#[instrument(skip_all, fields(dir = %global.dir.display()))]
pub fn execute(
    args: InitArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let dir = global.dir.as_path();
    std::fs::create_dir_all(dir)
        .with_cli_context(|| format!("Failed to create project directory '{}'", dir.display()))?;

    let fs = LocalFilesystem::new(dir);
    if ProjectFile::exists(&fs) {
        return Err(CliError::ProjectExists {
            path: dir.to_path_buf(),
        });
    }

    let version = parse_project_version(
        args.project_version
            .as_deref()
            .unwrap_or(&config.defaults.project_version),
    )?;
    let name = match args.project_name {
        Some(name) => name,
        None => directory_name(dir)?,
    };
    let domain = args
        .domain
        .or(config.defaults.domain)
        .unwrap_or_else(|| DEFAULT_DOMAIN.to_owned());
    let plugins = if args.plugins.plugins.is_empty() {
        config.defaults.plugins
    } else {
        args.plugins.plugins.clone()
    };
    debug!(%version, name = %name, domain = %domain, ?plugins, "initialising project");

    let mut project = ProjectFile::new(version.clone());
    project.set_project_name(&name);
    project.set_domain(&domain);

    output.info(&format!("Initialising {name} in {}", dir.display()))?;
    let request = ExecuteRequest::new(Operation::Init, version)
        .with_plugins(plugins)
        .with_flags(plugin_flags(&args.plugins)?);
    run_scaffold(request, &fs, &mut project, &output)
}

/// The last component of `dir` once made absolute.
fn directory_name(dir: &Path) -> CliResult<String> {
    let absolute = dir
        .canonicalize()
        .with_cli_context(|| format!("Failed to resolve '{}'", dir.display()))?;
    absolute
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .ok_or_else(|| CliError::InvalidInput {
            message: format!(
                "cannot derive a project name from '{}'; pass --project-name",
                absolute.display()
            ),
            source: None,
        })
}
