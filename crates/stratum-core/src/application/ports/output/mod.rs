//! Driven (output) ports - implemented by infrastructure.
//!
//! The `stratum-adapters` crate provides implementations.

use crate::application::ApplicationError;
use crate::domain::{PluginKey, ProjectVersion, Resource};
use crate::error::StratumResult;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// How `write_file` treats an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fail with `FileExists` if the file is already there.
    CreateNew,
    /// Create or replace.
    Truncate,
    /// Create or concatenate after the existing content.
    Append,
}

/// Port for the project file tree.
///
/// Implemented by:
/// - `stratum_adapters::filesystem::LocalFilesystem` (production)
/// - `stratum_adapters::filesystem::MemoryFilesystem` (testing)
///
/// All paths are relative to the project root.
pub trait Filesystem: Send + Sync {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Read a whole file as UTF-8.
    fn read_file(&self, path: &Path) -> StratumResult<String>;

    /// Write content to a file. Parent directories must already exist.
    fn write_file(&self, path: &Path, content: &str, mode: WriteMode) -> StratumResult<()>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> StratumResult<()>;
}

/// Port for the persisted per-project configuration.
///
/// Implemented by `stratum_adapters::project_file::ProjectFile`.
pub trait ProjectConfig {
    fn version(&self) -> &ProjectVersion;

    fn project_name(&self) -> Option<&str>;
    fn set_project_name(&mut self, name: &str);

    fn domain(&self) -> Option<&str>;
    fn set_domain(&mut self, domain: &str);

    fn is_multigroup(&self) -> bool;
    fn set_multigroup(&mut self, multigroup: bool);

    /// Plugin keys the project was initialised with.
    fn layout(&self) -> &[PluginKey];
    fn set_layout(&mut self, layout: Vec<PluginKey>);

    fn resources(&self) -> &[Resource];
    fn has_resource(&self, resource: &Resource) -> bool {
        self.resources().iter().any(|r| r.same_gvk(resource))
    }
    /// Insert, or merge webhooks into an existing entry with the same GVK.
    fn upsert_resource(&mut self, resource: Resource);

    /// Raw per-plugin table. `PluginConfigNotFound` means the plugin never
    /// stored anything for this project.
    fn plugin_config(&self, key: &PluginKey) -> StratumResult<serde_json::Value>;
    fn set_plugin_config(&mut self, key: &PluginKey, value: serde_json::Value);
}

impl dyn ProjectConfig + '_ {
    /// Decode this plugin's stored table into `T`.
    pub fn decode_plugin_config<T: DeserializeOwned>(&self, key: &PluginKey) -> StratumResult<T> {
        let value = self.plugin_config(key)?;
        serde_json::from_value(value).map_err(|e| {
            ApplicationError::PluginConfigInvalid {
                key: key.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Like `decode_plugin_config`, but a missing table yields `T::default()`.
    pub fn decode_plugin_config_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &PluginKey,
    ) -> StratumResult<T> {
        match self.decode_plugin_config(key) {
            Err(crate::error::StratumError::Application(
                ApplicationError::PluginConfigNotFound { .. },
            )) => Ok(T::default()),
            other => other,
        }
    }

    pub fn encode_plugin_config<T: Serialize>(
        &mut self,
        key: &PluginKey,
        config: &T,
    ) -> StratumResult<()> {
        let value =
            serde_json::to_value(config).map_err(|e| ApplicationError::PluginConfigInvalid {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        self.set_plugin_config(key, value);
        Ok(())
    }
}
