//! Scaffold Service - drives a resolved plugin set through the subcommand
//! lifecycle against one shared filesystem.
//!
//! Workflow for one invocation:
//! 1. Resolve the requested keys (see [`Resolver`])
//! 2. Create one subcommand per provider of the driven capability
//! 3. Bind metadata and flags for all of them, reject unknown flags
//! 4. Run each subcommand's full lifecycle, in resolved order
//! 5. Record the layout (init) or the resource (create) in the project config
//!
//! There is no rollback: a failure stops the run and leaves earlier writes
//! on disk.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info, info_span, instrument, warn};

use crate::application::ApplicationError;
use crate::application::plugin::{CliMetadata, LifecycleState, Subcommand, SubcommandMetadata};
use crate::application::ports::{Filesystem, ProjectConfig, WriteMode};
use crate::application::registry::Registry;
use crate::application::services::resolver::{ResolvedSet, Resolver};
use crate::domain::{
    FlagSet, FlagSpec, Operation, Phase, PluginKey, ProjectVersion, RawFlags, Resource,
};
use crate::error::{StratumError, StratumResult};

/// Everything the caller supplies for one run.
#[derive(Debug, Clone)]
pub struct ExecuteRequest {
    pub operation: Operation,
    pub plugins: Vec<String>,
    pub project_version: ProjectVersion,
    pub flags: RawFlags,
    pub resource: Option<Resource>,
    pub cli: CliMetadata,
}

impl ExecuteRequest {
    pub fn new(operation: Operation, project_version: ProjectVersion) -> Self {
        Self {
            operation,
            plugins: Vec::new(),
            project_version,
            flags: RawFlags::default(),
            resource: None,
            cli: CliMetadata {
                command_name: "stratum".into(),
            },
        }
    }

    pub fn with_plugins<I, S>(mut self, plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plugins = plugins.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_flags(mut self, flags: RawFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_command_name(mut self, name: impl Into<String>) -> Self {
        self.cli.command_name = name.into();
        self
    }
}

/// Outcome of one run. `written_paths` is filled even when the run failed.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub resolved: Vec<PluginKey>,
    pub written_paths: Vec<PathBuf>,
    pub error: Option<StratumError>,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> StratumResult<Vec<PathBuf>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.written_paths),
        }
    }
}

/// Help text and flags one plugin contributes to an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginHelp {
    pub key: PluginKey,
    pub metadata: SubcommandMetadata,
    pub flags: Vec<FlagSpec>,
}

struct Invocation {
    key: PluginKey,
    subcommand: Box<dyn Subcommand>,
    state: LifecycleState,
}

impl Invocation {
    fn advance(&mut self, phase: Phase, result: StratumResult<()>) -> StratumResult<()> {
        match result {
            Ok(()) => {
                let next = LifecycleState::after(phase);
                debug!(plugin = %self.key, from = ?self.state, to = ?next, "phase complete");
                self.state = next;
                Ok(())
            }
            Err(source) => {
                self.state = LifecycleState::Failed(phase);
                warn!(plugin = %self.key, phase = %phase, error = %source, "phase failed");
                Err(ApplicationError::PhaseFailed {
                    plugin: self.key.to_string(),
                    phase,
                    source: Box::new(source),
                }
                .into())
            }
        }
    }
}

/// Main scaffolding service.
pub struct ScaffoldService<'r> {
    registry: &'r Registry,
}

impl<'r> ScaffoldService<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn resolve(&self, request: &ExecuteRequest) -> StratumResult<ResolvedSet> {
        Resolver::new(self.registry).resolve(
            &request.plugins,
            &request.project_version,
            Some(request.operation.into()),
        )
    }

    /// Resolve, then collect each provider's metadata and flags without
    /// running anything.
    pub fn describe(&self, request: &ExecuteRequest) -> StratumResult<Vec<PluginHelp>> {
        let resolved = self.resolve(request)?;
        let capability = request.operation.capability();

        Ok(resolved
            .providers(capability)
            .filter_map(|plugin| {
                let subcommand = plugin.subcommand(capability)?;
                let mut metadata = SubcommandMetadata::default();
                subcommand.update_metadata(&request.cli, &mut metadata);
                let mut flags = FlagSet::new();
                subcommand.bind_flags(&mut flags);
                Some(PluginHelp {
                    key: plugin.key().clone(),
                    metadata,
                    flags: flags.specs().cloned().collect(),
                })
            })
            .collect())
    }

    /// Resolve and run. Never panics on plugin failure; the error is in the
    /// report alongside every path written before it.
    #[instrument(
        skip_all,
        fields(
            operation = %request.operation,
            project_version = %request.project_version
        )
    )]
    pub fn execute(
        &self,
        request: ExecuteRequest,
        fs: &dyn Filesystem,
        config: &mut dyn ProjectConfig,
    ) -> ExecutionReport {
        let resolved = match self.resolve(&request) {
            Ok(resolved) => resolved,
            Err(error) => {
                return ExecutionReport {
                    error: Some(error),
                    ..Default::default()
                };
            }
        };

        let tracking = TrackingFilesystem::new(fs);
        let result = self.run(&resolved, &request, &tracking, config);

        let report = ExecutionReport {
            resolved: resolved.keys(),
            written_paths: tracking.into_paths(),
            error: result.err(),
        };
        if report.is_success() {
            info!(files = report.written_paths.len(), "run completed");
        }
        report
    }

    /// Drive an already resolved set.
    pub fn run(
        &self,
        resolved: &ResolvedSet,
        request: &ExecuteRequest,
        fs: &dyn Filesystem,
        config: &mut dyn ProjectConfig,
    ) -> StratumResult<()> {
        let capability = request.operation.capability();

        let mut invocations: Vec<Invocation> = resolved
            .providers(capability)
            .filter_map(|plugin| {
                plugin.subcommand(capability).map(|subcommand| Invocation {
                    key: plugin.key().clone(),
                    subcommand,
                    state: LifecycleState::Created,
                })
            })
            .collect();

        let mut flags = FlagSet::new();
        for inv in &mut invocations {
            let mut metadata = SubcommandMetadata::default();
            inv.subcommand.update_metadata(&request.cli, &mut metadata);
            inv.advance(Phase::UpdateMetadata, Ok(()))?;
            inv.subcommand.bind_flags(&mut flags);
            inv.advance(Phase::BindFlags, Ok(()))?;
        }

        let unknown = request.flags.unknown(&flags);
        if !unknown.is_empty() {
            return Err(ApplicationError::ValidationFailed(format!(
                "unknown flag(s) {} for plugins {}",
                unknown
                    .iter()
                    .map(|n| format!("--{n}"))
                    .collect::<Vec<_>>()
                    .join(", "),
                invocations
                    .iter()
                    .map(|i| i.key.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
            .into());
        }
        request.flags.apply(&mut flags)?;

        let mut resource = self.prepare_resource(request, config)?;

        for inv in &mut invocations {
            let _span = info_span!("plugin", key = %inv.key).entered();
            info!(operation = %request.operation, "running plugin");

            let result = inv.subcommand.read_flags(&flags);
            inv.advance(Phase::ReadFlags, result)?;

            let result = inv.subcommand.inject_config(&*config);
            inv.advance(Phase::InjectConfig, result)?;

            if let Some(resource) = resource.as_mut() {
                let result = inv.subcommand.inject_resource(resource);
                inv.advance(Phase::InjectResource, result)?;
            }

            let result = inv.subcommand.pre_scaffold(&ReadOnlyFilesystem(fs));
            inv.advance(Phase::PreScaffold, result)?;

            let result = inv.subcommand.scaffold(fs, config);
            inv.advance(Phase::Scaffold, result)?;

            let result = inv.subcommand.post_scaffold(fs, config);
            inv.advance(Phase::PostScaffold, result)?;

            debug!(plugin = %inv.key, from = ?inv.state, "done");
            inv.state = LifecycleState::Done;
        }

        match (request.operation, resource) {
            (Operation::Init, _) => config.set_layout(resolved.keys()),
            (_, Some(resource)) => config.upsert_resource(resource),
            _ => {}
        }
        Ok(())
    }

    fn prepare_resource(
        &self,
        request: &ExecuteRequest,
        config: &dyn ProjectConfig,
    ) -> StratumResult<Option<Resource>> {
        if !request.operation.requires_resource() {
            return Ok(None);
        }
        let mut resource = request.resource.clone().ok_or_else(|| {
            ApplicationError::ValidationFailed(format!(
                "'{}' requires a resource (group, version, kind)",
                request.operation
            ))
        })?;
        if resource.domain.is_empty() {
            resource.domain = config.domain().unwrap_or_default().to_string();
        }
        resource.validate()?;
        Ok(Some(resource))
    }
}

/// Filesystem view handed to `pre_scaffold`: reads pass through, writes fail.
struct ReadOnlyFilesystem<'a>(&'a dyn Filesystem);

impl Filesystem for ReadOnlyFilesystem<'_> {
    fn exists(&self, path: &Path) -> bool {
        self.0.exists(path)
    }

    fn read_file(&self, path: &Path) -> StratumResult<String> {
        self.0.read_file(path)
    }

    fn write_file(&self, path: &Path, _content: &str, _mode: WriteMode) -> StratumResult<()> {
        Err(ApplicationError::ValidationFailed(format!(
            "pre-scaffold attempted to write {}",
            path.display()
        ))
        .into())
    }

    fn create_dir_all(&self, path: &Path) -> StratumResult<()> {
        Err(ApplicationError::ValidationFailed(format!(
            "pre-scaffold attempted to create {}",
            path.display()
        ))
        .into())
    }
}

/// Records every path successfully written through it, first write first.
struct TrackingFilesystem<'a> {
    inner: &'a dyn Filesystem,
    written: Mutex<Vec<PathBuf>>,
}

impl<'a> TrackingFilesystem<'a> {
    fn new(inner: &'a dyn Filesystem) -> Self {
        Self {
            inner,
            written: Mutex::new(Vec::new()),
        }
    }

    fn into_paths(self) -> Vec<PathBuf> {
        self.written
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Filesystem for TrackingFilesystem<'_> {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn read_file(&self, path: &Path) -> StratumResult<String> {
        self.inner.read_file(path)
    }

    fn write_file(&self, path: &Path, content: &str, mode: WriteMode) -> StratumResult<()> {
        self.inner.write_file(path, content, mode)?;
        let mut written = self
            .written
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?;
        if !written.iter().any(|p| p == path) {
            written.push(path.to_path_buf());
        }
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> StratumResult<()> {
        self.inner.create_dir_all(path)
    }
}
