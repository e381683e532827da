//! Application services - orchestrate use cases.
//!
//! Resolution, template writing, marker patching and the lifecycle driver
//! that ties them together.

pub mod marker_patcher;
pub mod resolver;
pub mod scaffold_service;
pub mod template_writer;

pub use marker_patcher::{MarkerPatcher, PatchOutcome};
pub use resolver::{CapabilityRequirement, ResolvedSet, Resolver};
pub use scaffold_service::{ExecuteRequest, ExecutionReport, PluginHelp, ScaffoldService};
pub use template_writer::{TemplateWriter, WriteOutcome, WrittenFile, project_defaults};
