//! `stratum edit`: change project-wide settings through the editor plugins.

use tracing::instrument;

use stratum_core::application::ExecuteRequest;
use stratum_core::application::ports::ProjectConfig;
use stratum_core::domain::Operation;

use crate::{
    cli::{EditArgs, GlobalArgs},
    commands::{create::chain, open_project, plugin_flags, run_scaffold},
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(dir = %global.dir.display()))]
pub fn execute(args: EditArgs, global: GlobalArgs, output: OutputManager) -> CliResult<()> {
    let (fs, mut project) = open_project(&global.dir)?;

    let request = ExecuteRequest::new(Operation::Edit, project.version().clone())
        .with_plugins(chain(&args.plugins, project.layout()))
        .with_flags(plugin_flags(&args.plugins)?);
    run_scaffold(request, &fs, &mut project, &output)
}
