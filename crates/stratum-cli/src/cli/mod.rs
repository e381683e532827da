//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use stratum_core::domain::{Operation, Webhooks};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stratum",
    bin_name = "stratum",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Layered project scaffolding driven by composable plugins",
    long_about = "Stratum resolves a chain of versioned plugins and lets each one \
                  write or patch files, so successive runs layer new APIs and \
                  webhooks onto a project without clobbering earlier output.",
    after_help = "EXAMPLES:\n\
        \x20 stratum init --project-name guestbook --domain example.com\n\
        \x20 stratum create api --group webapp --version v1 --kind Guestbook\n\
        \x20 stratum create webhook --group webapp --version v1 --kind Guestbook --defaulting\n\
        \x20 stratum list\n\
        \x20 stratum completions bash > /usr/share/bash-completion/completions/stratum",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialise a new project.
    #[command(
        about = "Initialise a new project",
        after_help = "EXAMPLES:\n\
            \x20 stratum init --project-name guestbook --domain example.com\n\
            \x20 stratum init --plugins base,manifests --dir ./guestbook\n\
            \x20 stratum init -- --owner \"ACME Inc.\""
    )]
    Init(InitArgs),

    /// Scaffold an API or a webhook.
    #[command(about = "Scaffold an API or a webhook", subcommand)]
    Create(CreateCommands),

    /// Change an existing project.
    #[command(
        about = "Edit the project configuration",
        after_help = "EXAMPLES:\n\
            \x20 stratum edit -- --multigroup"
    )]
    Edit(EditArgs),

    /// List available plugins.
    #[command(
        visible_alias = "ls",
        about = "List available plugins",
        after_help = "EXAMPLES:\n\
            \x20 stratum list\n\
            \x20 stratum list --format json\n\
            \x20 stratum list --operation create-api --plugins standard,samples-index"
    )]
    List(ListArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stratum completions bash > ~/.local/share/bash-completion/completions/stratum\n\
            \x20 stratum completions zsh  > ~/.zfunc/_stratum\n\
            \x20 stratum completions fish > ~/.config/fish/completions/stratum.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the Stratum configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stratum config get defaults.plugins\n\
            \x20 stratum config list\n\
            \x20 stratum config init"
    )]
    Config(ConfigCommands),
}

// ── shared ────────────────────────────────────────────────────────────────────

/// Plugin selection and pass-through plugin flags.
#[derive(Debug, Clone, Default, Args)]
pub struct PluginArgs {
    /// Plugin or bundle keys, in order.
    #[arg(
        long = "plugins",
        value_name = "KEYS",
        value_delimiter = ',',
        help = "Comma-separated plugin keys (name[/version])"
    )]
    pub plugins: Vec<String>,

    /// Flags forwarded to the plugins, given after `--`.
    #[arg(last = true, value_name = "PLUGIN_FLAGS")]
    pub plugin_flags: Vec<String>,
}

/// Group / version / kind of the resource to scaffold.
#[derive(Debug, Clone, Args)]
pub struct ResourceArgs {
    /// API group, empty for the core group.
    #[arg(long = "group", value_name = "GROUP", default_value = "")]
    pub group: String,

    /// API version, e.g. v1 or v1beta1.
    #[arg(long = "version", value_name = "VERSION")]
    pub api_version: String,

    /// Kind in PascalCase.
    #[arg(long = "kind", value_name = "KIND")]
    pub kind: String,

    /// Override the generated plural.
    #[arg(long = "plural", value_name = "PLURAL")]
    pub plural: Option<String>,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `stratum init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    #[command(flatten)]
    pub plugins: PluginArgs,

    /// Project layout version.
    #[arg(long = "project-version", value_name = "VERSION")]
    pub project_version: Option<String>,

    /// Project name (defaults to the directory name).
    #[arg(long = "project-name", value_name = "NAME")]
    pub project_name: Option<String>,

    /// Domain appended to API groups.
    #[arg(long = "domain", value_name = "DOMAIN")]
    pub domain: Option<String>,
}

// ── create ────────────────────────────────────────────────────────────────────

/// Subcommands for `stratum create`.
#[derive(Debug, Subcommand)]
pub enum CreateCommands {
    /// Scaffold a new API.
    #[command(after_help = "EXAMPLES:\n\
        \x20 stratum create api --group batch --version v1 --kind CronJob\n\
        \x20 stratum create api --group batch --version v1 --kind CronJob -- --force")]
    Api(CreateApiArgs),

    /// Scaffold a webhook for an existing API.
    #[command(after_help = "EXAMPLES:\n\
        \x20 stratum create webhook --group batch --version v1 --kind CronJob --defaulting")]
    Webhook(CreateWebhookArgs),
}

#[derive(Debug, Args)]
pub struct CreateApiArgs {
    #[command(flatten)]
    pub resource: ResourceArgs,

    #[command(flatten)]
    pub plugins: PluginArgs,
}

#[derive(Debug, Args)]
pub struct CreateWebhookArgs {
    #[command(flatten)]
    pub resource: ResourceArgs,

    /// Scaffold a defaulting (mutating) webhook.
    #[arg(long = "defaulting")]
    pub defaulting: bool,

    /// Scaffold a validating webhook.
    #[arg(long = "validation")]
    pub validation: bool,

    /// Scaffold a conversion webhook.
    #[arg(long = "conversion")]
    pub conversion: bool,

    #[command(flatten)]
    pub plugins: PluginArgs,
}

impl CreateWebhookArgs {
    pub fn webhooks(&self) -> Webhooks {
        Webhooks {
            defaulting: self.defaulting,
            validation: self.validation,
            conversion: self.conversion,
        }
    }
}

// ── edit ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EditArgs {
    #[command(flatten)]
    pub plugins: PluginArgs,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `stratum list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show plugins supporting this project version.
    #[arg(long = "project-version", value_name = "VERSION")]
    pub project_version: Option<String>,

    /// Describe what the plugins contribute to one operation.
    #[arg(long = "operation", value_enum, value_name = "OPERATION")]
    pub operation: Option<OperationArg>,

    /// Plugins to describe with `--operation`.
    #[arg(long = "plugins", value_name = "KEYS", value_delimiter = ',')]
    pub plugins: Vec<String>,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One key per line.
    List,
    /// JSON array.
    Json,
}

/// Operations `list --operation` can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OperationArg {
    Init,
    CreateApi,
    CreateWebhook,
    Edit,
}

impl From<OperationArg> for Operation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::Init => Operation::Init,
            OperationArg::CreateApi => Operation::CreateApi,
            OperationArg::CreateWebhook => Operation::CreateWebhook,
            OperationArg::Edit => Operation::Edit,
        }
    }
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `stratum completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `stratum config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `defaults.plugins`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the default configuration file.
    Path,
    /// Write a configuration file holding the defaults.
    Init {
        /// Where to write (defaults to the platform config directory).
        #[arg(long = "path", value_name = "FILE")]
        path: Option<PathBuf>,

        /// Overwrite an existing config file.
        #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
        force: bool,
    },
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_init_with_plugin_flags() {
        let cli = Cli::parse_from([
            "stratum",
            "init",
            "--plugins",
            "base,manifests",
            "--domain",
            "example.com",
            "--",
            "--owner=ACME",
        ]);
        let Commands::Init(args) = cli.command else {
            panic!("expected Init command");
        };
        assert_eq!(args.plugins.plugins, vec!["base", "manifests"]);
        assert_eq!(args.plugins.plugin_flags, vec!["--owner=ACME"]);
        assert_eq!(args.domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn parse_create_api() {
        let cli = Cli::parse_from([
            "stratum", "create", "api", "--group", "batch", "--version", "v1", "--kind", "CronJob",
        ]);
        let Commands::Create(CreateCommands::Api(args)) = cli.command else {
            panic!("expected create api");
        };
        assert_eq!(args.resource.group, "batch");
        assert_eq!(args.resource.api_version, "v1");
        assert_eq!(args.resource.kind, "CronJob");
        assert!(args.plugins.plugins.is_empty());
    }

    #[test]
    fn create_api_requires_kind() {
        let result = Cli::try_parse_from(["stratum", "create", "api", "--version", "v1"]);
        assert!(result.is_err());
    }

    #[test]
    fn webhook_flags_map_to_webhooks() {
        let cli = Cli::parse_from([
            "stratum",
            "create",
            "webhook",
            "--version",
            "v1",
            "--kind",
            "CronJob",
            "--validation",
        ]);
        let Commands::Create(CreateCommands::Webhook(args)) = cli.command else {
            panic!("expected create webhook");
        };
        let webhooks = args.webhooks();
        assert!(webhooks.validation);
        assert!(!webhooks.defaulting);
    }

    #[test]
    fn dir_is_global() {
        let cli = Cli::parse_from(["stratum", "edit", "--dir", "/tmp/project"]);
        assert_eq!(cli.global.dir, PathBuf::from("/tmp/project"));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["stratum", "--quiet", "--verbose", "list"]);
        assert!(result.is_err());
    }
}
