//! Command handlers, one module per subcommand.
//!
//! The scaffolding commands (`init`, `create`, `edit`) share the helpers
//! below: open the project, run the engine, persist the project file only
//! when the run succeeded, and print the report.

pub mod completions;
pub mod config;
pub mod create;
pub mod edit;
pub mod init;
pub mod list;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use stratum_adapters::{LocalFilesystem, ProjectFile, builtin_registry};
use stratum_core::application::{ExecuteRequest, ScaffoldService};
use stratum_core::domain::{Operation, ProjectVersion, RawFlags, Resource};
use stratum_core::error::StratumError;

use crate::cli::{PluginArgs, ResourceArgs};
use crate::error::{CliError, CliResult};
use crate::output::OutputManager;

/// What a scaffolding command reports, in JSON output mode.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    operation: Operation,
    resolved: Vec<String>,
    written: &'a [PathBuf],
}

pub(crate) fn parse_project_version(raw: &str) -> CliResult<ProjectVersion> {
    Ok(ProjectVersion::new(raw).map_err(StratumError::from)?)
}

/// Parse the pass-through arguments given after `--`.
pub(crate) fn plugin_flags(args: &PluginArgs) -> CliResult<RawFlags> {
    Ok(RawFlags::parse(&args.plugin_flags).map_err(StratumError::from)?)
}

pub(crate) fn resource(args: &ResourceArgs) -> Resource {
    let resource = Resource::new(&args.group, &args.api_version, &args.kind);
    match &args.plural {
        Some(plural) => resource.with_plural(plural),
        None => resource,
    }
}

/// Open the project rooted at `dir`.
pub(crate) fn open_project(dir: &Path) -> CliResult<(LocalFilesystem, ProjectFile)> {
    let fs = LocalFilesystem::new(dir);
    if !ProjectFile::exists(&fs) {
        return Err(CliError::ProjectNotFound {
            path: dir.to_path_buf(),
        });
    }
    let project = ProjectFile::load(&fs)?;
    Ok((fs, project))
}

/// Run `request` against the project and save it if every plugin succeeded.
///
/// Files written before a failure stay on disk and are listed, but the
/// project file is left untouched.
pub(crate) fn run_scaffold(
    request: ExecuteRequest,
    fs: &LocalFilesystem,
    project: &mut ProjectFile,
    output: &OutputManager,
) -> CliResult<()> {
    let operation = request.operation;
    let registry = builtin_registry()?;
    let report = ScaffoldService::new(&registry).execute(request, fs, project);

    if let Some(error) = report.error {
        if !report.written_paths.is_empty() {
            warn!(
                files = report.written_paths.len(),
                "run failed after writing files"
            );
            output.warning("Files written before the failure:")?;
            output.written_files(&report.written_paths)?;
        }
        return Err(error.into());
    }

    project.save(fs)?;
    info!(%operation, files = report.written_paths.len(), "project updated");

    let resolved: Vec<String> = report.resolved.iter().map(ToString::to_string).collect();
    if output.is_json() {
        output.json(&RunSummary {
            operation,
            resolved,
            written: &report.written_paths,
        })?;
        return Ok(());
    }

    output.success(&format!("{operation} completed with {}", resolved.join(", ")))?;
    output.written_files(&report.written_paths)?;
    Ok(())
}
