//! Implementation of the `stratum list` command.

use serde::Serialize;

use stratum_adapters::builtin_registry;
use stratum_core::application::plugin::Plugin;
use stratum_core::application::{
    ExecuteRequest, PluginHelp, Registry, RegistryEntry, ScaffoldService,
};
use stratum_core::domain::{FlagValue, Operation, ProjectVersion};

use crate::{
    cli::{ListArgs, ListFormat},
    commands::parse_project_version,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// One row of `stratum list`.
#[derive(Debug, Serialize)]
struct PluginRow {
    key: String,
    kind: &'static str,
    /// Capabilities for plugins, member keys for bundles.
    provides: Vec<String>,
}

#[derive(Debug, Serialize)]
struct FlagRow {
    name: String,
    default: String,
    help: String,
}

#[derive(Debug, Serialize)]
struct HelpRow {
    key: String,
    description: String,
    examples: String,
    flags: Vec<FlagRow>,
}

pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let registry = builtin_registry()?;
    let version = parse_project_version(
        args.project_version
            .as_deref()
            .unwrap_or(&config.defaults.project_version),
    )?;

    let format = if output.is_json() {
        ListFormat::Json
    } else {
        args.format
    };

    match args.operation {
        Some(operation) => {
            let plugins = if args.plugins.is_empty() {
                config.defaults.plugins
            } else {
                args.plugins
            };
            describe(&registry, operation.into(), version, plugins, format, &output)
        }
        None => list(&registry, &version, format, &output),
    }
}

fn rows(registry: &Registry, version: &ProjectVersion) -> Vec<PluginRow> {
    registry
        .all_keys(version)
        .into_iter()
        .filter_map(|key| registry.get(&key).cloned())
        .map(|entry| match entry {
            RegistryEntry::Plugin(plugin) => PluginRow {
                key: plugin.key().to_string(),
                kind: "plugin",
                provides: plugin
                    .capabilities()
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            },
            RegistryEntry::Bundle(bundle) => PluginRow {
                key: bundle.key().to_string(),
                kind: "bundle",
                provides: bundle.members().iter().map(ToString::to_string).collect(),
            },
        })
        .collect()
}

fn list(
    registry: &Registry,
    version: &ProjectVersion,
    format: ListFormat,
    output: &OutputManager,
) -> CliResult<()> {
    let rows = rows(registry, version);

    match format {
        ListFormat::Table => {
            if rows.is_empty() {
                let known: Vec<String> = registry
                    .project_versions()
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                output.warning(&format!(
                    "No plugins support project version {version}; known versions: {}",
                    known.join(", ")
                ))?;
                return Ok(());
            }
            output.header(&format!("Plugins for project version {version}:"))?;
            for row in &rows {
                output.print(&format!(
                    "  {:<40} {:<7} {}",
                    row.key,
                    row.kind,
                    row.provides.join(", ")
                ))?;
            }
        }
        ListFormat::List => {
            for row in &rows {
                output.print(&row.key)?;
            }
        }
        ListFormat::Json => output.json(&rows)?,
    }

    Ok(())
}

fn help_row(help: PluginHelp) -> HelpRow {
    HelpRow {
        key: help.key.to_string(),
        description: help.metadata.description,
        examples: help.metadata.examples,
        flags: help
            .flags
            .into_iter()
            .map(|spec| FlagRow {
                name: format!("--{}", spec.name),
                default: match spec.default {
                    FlagValue::Bool(value) => value.to_string(),
                    FlagValue::String(value) => value,
                },
                help: spec.help,
            })
            .collect(),
    }
}

fn describe(
    registry: &Registry,
    operation: Operation,
    version: ProjectVersion,
    plugins: Vec<String>,
    format: ListFormat,
    output: &OutputManager,
) -> CliResult<()> {
    let request = ExecuteRequest::new(operation, version).with_plugins(plugins);
    let helps: Vec<HelpRow> = ScaffoldService::new(registry)
        .describe(&request)?
        .into_iter()
        .map(help_row)
        .collect();

    match format {
        ListFormat::Json => output.json(&helps)?,
        ListFormat::List => {
            for help in &helps {
                output.print(&help.key)?;
            }
        }
        ListFormat::Table => {
            output.header(&format!("Plugins taking part in '{operation}':"))?;
            for help in &helps {
                output.print(&format!("\n  {}", help.key))?;
                output.print(&format!("    {}", help.description))?;
                for flag in &help.flags {
                    output.print(&format!(
                        "    {:<14} {} (default: {})",
                        flag.name, flag.help, flag.default
                    ))?;
                }
                if !help.examples.is_empty() {
                    output.print(&help.examples)?;
                }
            }
        }
    }

    Ok(())
}
