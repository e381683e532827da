//! Application layer for Stratum.
//!
//! This layer contains:
//! - **Plugin model**: capability traits and the subcommand lifecycle
//! - **Registry**: the catalog of plugins and bundles
//! - **Services**: resolution, template writing, marker patching, execution
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types

pub mod error;
pub mod plugin;
pub mod ports;
pub mod registry;
pub mod services;

pub use services::{
    CapabilityRequirement, ExecuteRequest, ExecutionReport, MarkerPatcher, PatchOutcome,
    PluginHelp, ResolvedSet, Resolver, ScaffoldService, TemplateWriter, WriteOutcome,
    WrittenFile, project_defaults,
};

pub use registry::{Registry, RegistryBuilder, RegistryEntry};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, ProjectConfig, WriteMode};

pub use error::ApplicationError;
