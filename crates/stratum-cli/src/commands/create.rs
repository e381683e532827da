//! `stratum create api` and `stratum create webhook`.

use tracing::instrument;

use stratum_core::application::ExecuteRequest;
use stratum_core::application::ports::ProjectConfig;
use stratum_core::domain::{Operation, PluginKey, Resource};

use crate::{
    cli::{CreateCommands, GlobalArgs, PluginArgs},
    commands::{open_project, plugin_flags, resource, run_scaffold},
    error::CliResult,
    output::OutputManager,
};

pub fn execute(cmd: CreateCommands, global: GlobalArgs, output: OutputManager) -> CliResult<()> {
    match cmd {
        CreateCommands::Api(args) => run(
            Operation::CreateApi,
            resource(&args.resource),
            &args.plugins,
            &global,
            &output,
        ),
        CreateCommands::Webhook(args) => {
            let target = resource(&args.resource).with_webhooks(args.webhooks());
            run(
                Operation::CreateWebhook,
                target,
                &args.plugins,
                &global,
                &output,
            )
        }
    }
}

#[instrument(skip_all, fields(operation = %operation, resource = %target))]
fn run(
    operation: Operation,
    target: Resource,
    plugins: &PluginArgs,
    global: &GlobalArgs,
    output: &OutputManager,
) -> CliResult<()> {
    let (fs, mut project) = open_project(&global.dir)?;

    let request = ExecuteRequest::new(operation, project.version().clone())
        .with_plugins(chain(plugins, project.layout()))
        .with_flags(plugin_flags(plugins)?)
        .with_resource(target);
    run_scaffold(request, &fs, &mut project, output)
}

/// Requested plugins, or the ones recorded at init.
pub(crate) fn chain(args: &PluginArgs, layout: &[PluginKey]) -> Vec<String> {
    if args.plugins.is_empty() {
        layout.iter().map(ToString::to_string).collect()
    } else {
        args.plugins.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_defaults_to_layout() {
        let layout = vec![PluginKey::parse("base.stratum.dev/v1").unwrap()];
        assert_eq!(
            chain(&PluginArgs::default(), &layout),
            vec!["base.stratum.dev/v1"]
        );
    }

    #[test]
    fn chain_prefers_requested_plugins() {
        let layout = vec![PluginKey::parse("base.stratum.dev/v1").unwrap()];
        let args = PluginArgs {
            plugins: vec!["samples-index".into()],
            plugin_flags: vec![],
        };
        assert_eq!(chain(&args, &layout), vec!["samples-index"]);
    }
}
