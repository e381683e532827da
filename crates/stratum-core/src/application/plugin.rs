//! Plugin capability traits and the per-invocation subcommand lifecycle.
//!
//! A [`Plugin`] is an immutable, registered unit of generation behaviour. It
//! exposes any subset of the four capabilities through the `as_*` queries;
//! each capability hands out a fresh [`Subcommand`] per run, which carries
//! all mutable state (flags, injected config, resource) for that run.
//!
//! ```text
//! Created → MetadataBound → FlagsBound → ConfigInjected → [ResourceInjected]
//!         → PreScaffolded → Scaffolded → [PostScaffolded] → Done
//!                      any failure ──► Failed(phase)
//! ```

use crate::application::ports::{Filesystem, ProjectConfig};
use crate::domain::{Capability, FlagSet, Phase, PluginKey, ProjectVersion, Resource};
use crate::error::StratumResult;

/// Information about the invoking command, used for help text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliMetadata {
    pub command_name: String,
}

/// Help text a subcommand contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubcommandMetadata {
    pub description: String,
    pub examples: String,
}

/// One capability instance for one run.
///
/// Only `scaffold` (and `post_scaffold`) may write to the filesystem.
pub trait Subcommand {
    /// Pure; fills in help text.
    fn update_metadata(&self, _cli: &CliMetadata, _meta: &mut SubcommandMetadata) {}

    /// Declare this subcommand's flags.
    fn bind_flags(&self, _flags: &mut FlagSet) {}

    /// Read back the values populated by the caller.
    fn read_flags(&mut self, _flags: &FlagSet) -> StratumResult<()> {
        Ok(())
    }

    fn inject_config(&mut self, config: &dyn ProjectConfig) -> StratumResult<()>;

    /// Only called for resource-driven operations. May fill in defaults on
    /// the shared resource.
    fn inject_resource(&mut self, _resource: &mut Resource) -> StratumResult<()> {
        Ok(())
    }

    /// Validation against the current tree. Must not write.
    fn pre_scaffold(&mut self, _fs: &dyn Filesystem) -> StratumResult<()> {
        Ok(())
    }

    fn scaffold(&mut self, fs: &dyn Filesystem, config: &mut dyn ProjectConfig)
    -> StratumResult<()>;

    fn post_scaffold(
        &mut self,
        _fs: &dyn Filesystem,
        _config: &mut dyn ProjectConfig,
    ) -> StratumResult<()> {
        Ok(())
    }
}

pub trait Initializer: Send + Sync {
    fn init_subcommand(&self) -> Box<dyn Subcommand>;
}

pub trait ApiCreator: Send + Sync {
    fn create_api_subcommand(&self) -> Box<dyn Subcommand>;
}

pub trait WebhookCreator: Send + Sync {
    fn create_webhook_subcommand(&self) -> Box<dyn Subcommand>;
}

pub trait Editor: Send + Sync {
    fn edit_subcommand(&self) -> Box<dyn Subcommand>;
}

/// A registered plugin. Capabilities are discovered through the `as_*`
/// queries; a plugin overrides only the ones it provides.
pub trait Plugin: Send + Sync {
    fn key(&self) -> &PluginKey;

    fn supported_project_versions(&self) -> &[ProjectVersion];

    fn deprecation(&self) -> Option<&str> {
        None
    }

    fn as_initializer(&self) -> Option<&dyn Initializer> {
        None
    }

    fn as_api_creator(&self) -> Option<&dyn ApiCreator> {
        None
    }

    fn as_webhook_creator(&self) -> Option<&dyn WebhookCreator> {
        None
    }

    fn as_editor(&self) -> Option<&dyn Editor> {
        None
    }
}

impl dyn Plugin + '_ {
    pub fn provides(&self, capability: Capability) -> bool {
        match capability {
            Capability::Initializer => self.as_initializer().is_some(),
            Capability::ApiCreator => self.as_api_creator().is_some(),
            Capability::WebhookCreator => self.as_webhook_creator().is_some(),
            Capability::Editor => self.as_editor().is_some(),
        }
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.provides(*c))
            .collect()
    }

    /// A fresh subcommand for `capability`, if provided.
    pub fn subcommand(&self, capability: Capability) -> Option<Box<dyn Subcommand>> {
        match capability {
            Capability::Initializer => self.as_initializer().map(|c| c.init_subcommand()),
            Capability::ApiCreator => self.as_api_creator().map(|c| c.create_api_subcommand()),
            Capability::WebhookCreator => self
                .as_webhook_creator()
                .map(|c| c.create_webhook_subcommand()),
            Capability::Editor => self.as_editor().map(|c| c.edit_subcommand()),
        }
    }

    pub fn supports(&self, version: &ProjectVersion) -> bool {
        self.supported_project_versions().contains(version)
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation().is_some()
    }
}

/// Where a subcommand is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    MetadataBound,
    FlagsBound,
    ConfigInjected,
    ResourceInjected,
    PreScaffolded,
    Scaffolded,
    PostScaffolded,
    Done,
    Failed(Phase),
}

impl LifecycleState {
    /// State reached after `phase` completes successfully.
    pub fn after(phase: Phase) -> Self {
        match phase {
            Phase::UpdateMetadata => Self::MetadataBound,
            Phase::BindFlags | Phase::ReadFlags => Self::FlagsBound,
            Phase::InjectConfig => Self::ConfigInjected,
            Phase::InjectResource => Self::ResourceInjected,
            Phase::PreScaffold => Self::PreScaffolded,
            Phase::Scaffold => Self::Scaffolded,
            Phase::PostScaffold => Self::PostScaffolded,
        }
    }
}
