//! TOML-backed project configuration stored in `PROJECT` at the project root.
//!
//! ## File Format
//!
//! ```toml
//! version = "3"
//! project_name = "guestbook"
//! domain = "example.com"
//! layout = ["base.stratum.dev/v1", "manifests.stratum.dev/v1"]
//!
//! [[resources]]
//! group = "webapp"
//! version = "v1"
//! kind = "Guestbook"
//!
//! [plugins."samples-index.stratum.dev/v1-alpha"]
//! sample_paths_declared = true
//! ```
//!
//! `plugins` holds one opaque table per plugin key. The engine never looks
//! inside; plugins decode their own table through
//! [`ProjectConfig::plugin_config`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use stratum_core::application::ApplicationError;
use stratum_core::application::ports::{Filesystem, ProjectConfig, WriteMode};
use stratum_core::domain::{PluginKey, ProjectVersion, Resource};
use stratum_core::error::{StratumError, StratumResult};

#[derive(Debug, Error)]
pub enum ProjectFileError {
    #[error("{file} is not valid: {source}")]
    Parse {
        file: &'static str,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialise {file}: {source}")]
    Serialize {
        file: &'static str,
        #[source]
        source: toml::ser::Error,
    },
}

impl From<ProjectFileError> for StratumError {
    fn from(err: ProjectFileError) -> Self {
        StratumError::Configuration {
            message: err.to_string(),
        }
    }
}

/// The persisted per-project configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    version: ProjectVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    domain: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    multigroup: bool,
    #[serde(default)]
    layout: Vec<PluginKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    plugins: BTreeMap<String, serde_json::Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ProjectFile {
    pub const FILE_NAME: &'static str = "PROJECT";

    pub fn new(version: ProjectVersion) -> Self {
        Self {
            version,
            project_name: None,
            domain: None,
            multigroup: false,
            layout: Vec::new(),
            resources: Vec::new(),
            plugins: BTreeMap::new(),
        }
    }

    pub fn exists(fs: &dyn Filesystem) -> bool {
        fs.exists(Path::new(Self::FILE_NAME))
    }

    #[instrument(skip(fs))]
    pub fn load(fs: &dyn Filesystem) -> StratumResult<Self> {
        let raw = fs.read_file(Path::new(Self::FILE_NAME))?;
        let project = Self::from_toml(&raw)?;
        debug!(
            version = %project.version,
            layout = project.layout.len(),
            resources = project.resources.len(),
            "loaded project file"
        );
        Ok(project)
    }

    #[instrument(skip(self, fs))]
    pub fn save(&self, fs: &dyn Filesystem) -> StratumResult<()> {
        let raw = self.to_toml()?;
        fs.write_file(Path::new(Self::FILE_NAME), &raw, WriteMode::Truncate)?;
        info!(file = Self::FILE_NAME, "saved project file");
        Ok(())
    }

    pub fn from_toml(raw: &str) -> Result<Self, ProjectFileError> {
        toml::from_str(raw).map_err(|source| ProjectFileError::Parse {
            file: Self::FILE_NAME,
            source,
        })
    }

    pub fn to_toml(&self) -> Result<String, ProjectFileError> {
        toml::to_string(self).map_err(|source| ProjectFileError::Serialize {
            file: Self::FILE_NAME,
            source,
        })
    }
}

impl ProjectConfig for ProjectFile {
    fn version(&self) -> &ProjectVersion {
        &self.version
    }

    fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }

    fn set_project_name(&mut self, name: &str) {
        self.project_name = Some(name.to_string());
    }

    fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    fn set_domain(&mut self, domain: &str) {
        self.domain = Some(domain.to_string());
    }

    fn is_multigroup(&self) -> bool {
        self.multigroup
    }

    fn set_multigroup(&mut self, multigroup: bool) {
        self.multigroup = multigroup;
    }

    fn layout(&self) -> &[PluginKey] {
        &self.layout
    }

    fn set_layout(&mut self, layout: Vec<PluginKey>) {
        self.layout = layout;
    }

    fn resources(&self) -> &[Resource] {
        &self.resources
    }

    fn upsert_resource(&mut self, resource: Resource) {
        match self.resources.iter_mut().find(|r| r.same_gvk(&resource)) {
            Some(existing) => {
                existing.webhooks.merge(resource.webhooks);
                if existing.plural.is_none() {
                    existing.plural = resource.plural;
                }
            }
            None => self.resources.push(resource),
        }
    }

    fn plugin_config(&self, key: &PluginKey) -> StratumResult<serde_json::Value> {
        self.plugins.get(&key.to_string()).cloned().ok_or_else(|| {
            ApplicationError::PluginConfigNotFound {
                key: key.to_string(),
            }
            .into()
        })
    }

    fn set_plugin_config(&mut self, key: &PluginKey, value: serde_json::Value) {
        self.plugins.insert(key.to_string(), value);
    }
}
