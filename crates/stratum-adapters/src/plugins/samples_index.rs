//! `samples-index.stratum.dev/v1-alpha`: keeps a `SAMPLE_PATHS` Makefile
//! variable listing every sample manifest.
//!
//! The first run inserts the variable after the Makefile vars marker; later
//! runs replace the existing `SAMPLE_PATHS` line. The line itself is the
//! guard, so a run that patched the Makefile but failed before the project
//! file was saved does not declare the variable twice. The
//! `sample_paths_declared` flag in this plugin's project-file table records
//! the same fact for tooling that reads `PROJECT`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use stratum_core::application::plugin::{
    ApiCreator, CliMetadata, Plugin, Subcommand, SubcommandMetadata,
};
use stratum_core::application::ports::{Filesystem, ProjectConfig};
use stratum_core::application::{ApplicationError, MarkerPatcher, PatchOutcome};
use stratum_core::domain::{PluginKey, ProjectVersion, Resource, Stage};
use stratum_core::error::StratumResult;

use super::{GITIGNORE_MARKER, MAKEFILE_VARS_MARKER, plugin_key, supported_versions};

const MAKEFILE: &str = "Makefile";
const GITIGNORE: &str = ".gitignore";
const GENERATED_SAMPLES_RULE: &str = "/config/samples/*.generated.yaml\n";
const SAMPLE_PATHS_PREFIX: &str = "SAMPLE_PATHS ?=";

/// Persisted under this plugin's key in the project file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplesIndexConfig {
    pub sample_paths_declared: bool,
    pub samples: Vec<String>,
}

impl SamplesIndexConfig {
    /// The Makefile line for the current sample list.
    pub fn makefile_line(&self) -> String {
        format!("{SAMPLE_PATHS_PREFIX} {}\n", self.samples.join(" "))
    }
}

pub struct SamplesIndexPlugin {
    key: PluginKey,
    versions: Vec<ProjectVersion>,
}

impl SamplesIndexPlugin {
    pub fn new() -> StratumResult<Self> {
        Ok(Self {
            key: Self::key()?,
            versions: supported_versions()?,
        })
    }

    pub fn key() -> StratumResult<PluginKey> {
        plugin_key("samples-index.stratum.dev", 1, Stage::Alpha)
    }
}

impl Plugin for SamplesIndexPlugin {
    fn key(&self) -> &PluginKey {
        &self.key
    }

    fn supported_project_versions(&self) -> &[ProjectVersion] {
        &self.versions
    }

    fn as_api_creator(&self) -> Option<&dyn ApiCreator> {
        Some(self)
    }
}

impl ApiCreator for SamplesIndexPlugin {
    fn create_api_subcommand(&self) -> Box<dyn Subcommand> {
        Box::new(IndexSubcommand {
            key: self.key.clone(),
            state: SamplesIndexConfig::default(),
            sample: None,
        })
    }
}

struct IndexSubcommand {
    key: PluginKey,
    state: SamplesIndexConfig,
    sample: Option<String>,
}

impl Subcommand for IndexSubcommand {
    fn update_metadata(&self, cli: &CliMetadata, meta: &mut SubcommandMetadata) {
        meta.description = "Track sample manifests in the Makefile SAMPLE_PATHS variable.".into();
        meta.examples = format!(
            "  {} create api --group batch --version v1 --kind CronJob \
             --plugins standard,samples-index",
            cli.command_name
        );
    }

    fn inject_config(&mut self, config: &dyn ProjectConfig) -> StratumResult<()> {
        self.state = config.decode_plugin_config_or_default(&self.key)?;
        Ok(())
    }

    fn inject_resource(&mut self, resource: &mut Resource) -> StratumResult<()> {
        self.sample = Some(format!("config/samples/{}.yaml", resource.file_stem()));
        Ok(())
    }

    fn pre_scaffold(&mut self, fs: &dyn Filesystem) -> StratumResult<()> {
        for required in [MAKEFILE, GITIGNORE] {
            if !fs.exists(Path::new(required)) {
                return Err(ApplicationError::ValidationFailed(format!(
                    "{required} is missing; initialise the project with base.stratum.dev first"
                ))
                .into());
            }
        }
        Ok(())
    }

    fn scaffold(
        &mut self,
        fs: &dyn Filesystem,
        config: &mut dyn ProjectConfig,
    ) -> StratumResult<()> {
        let Some(sample) = self.sample.clone() else {
            return Ok(());
        };
        if self.state.samples.contains(&sample) {
            debug!(sample = %sample, "sample already indexed");
            return Ok(());
        }

        let patcher = MarkerPatcher::new(fs);
        let makefile = Path::new(MAKEFILE);
        self.state.samples.push(sample);
        let line = self.state.makefile_line();

        let content = fs.read_file(makefile)?;
        match declared_line(&content) {
            Some(existing) => {
                if !self.state.sample_paths_declared {
                    debug!("SAMPLE_PATHS present but not recorded; replacing it");
                }
                patcher.replace(makefile, existing, line.trim_end())?;
            }
            None => patcher.insert_after(makefile, MAKEFILE_VARS_MARKER, &line)?,
        }
        self.state.sample_paths_declared = true;
        info!(samples = self.state.samples.len(), "updated SAMPLE_PATHS");

        config.encode_plugin_config(&self.key, &self.state)?;
        Ok(())
    }

    fn post_scaffold(
        &mut self,
        fs: &dyn Filesystem,
        _config: &mut dyn ProjectConfig,
    ) -> StratumResult<()> {
        let outcome = MarkerPatcher::new(fs).ensure_after(
            Path::new(GITIGNORE),
            GITIGNORE_MARKER,
            GENERATED_SAMPLES_RULE,
            GENERATED_SAMPLES_RULE,
        )?;
        if outcome == PatchOutcome::AlreadyApplied {
            debug!(path = GITIGNORE, "ignore rule present");
        }
        Ok(())
    }
}

/// The `SAMPLE_PATHS` line already in the Makefile, without its newline.
fn declared_line(makefile: &str) -> Option<&str> {
    makefile
        .lines()
        .find(|line| line.starts_with(SAMPLE_PATHS_PREFIX))
}
