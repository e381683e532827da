//! Application layer errors.
//!
//! These errors represent failures while executing plugins against a file
//! tree. Rule violations during resolution are `DomainError`s.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::Phase;
use crate::error::{ErrorCategory, StratumError};

/// Errors that occur during scaffold execution.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// In-memory store access failed (lock poisoned).
    #[error("Store lock poisoned")]
    StoreLockError,

    /// A template with `ExistsPolicy::Error` hit an existing file.
    #[error("File already exists: {path}")]
    FileExists { path: PathBuf },

    /// A marker patch could not find its anchor.
    #[error("Anchor not found in {path}: {anchor:?}")]
    AnchorNotFound { path: PathBuf, anchor: String },

    /// A plugin rejected its input (pre-scaffold check, resource or flags).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The project has no configuration stored for this plugin yet.
    #[error("No configuration stored for plugin '{key}'")]
    PluginConfigNotFound { key: String },

    /// Stored plugin configuration could not be decoded or encoded.
    #[error("Invalid configuration for plugin '{key}': {reason}")]
    PluginConfigInvalid { key: String, reason: String },

    /// A plugin lifecycle step failed.
    #[error("Plugin '{plugin}' failed during {phase}: {source}")]
    PhaseFailed {
        plugin: String,
        phase: Phase,
        #[source]
        source: Box<StratumError>,
    },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::StoreLockError => vec!["An earlier operation panicked; retry the run".into()],
            Self::FileExists { path } => vec![
                format!("Remove or rename {} and run again", path.display()),
                "Files written before this one were kept".into(),
            ],
            Self::AnchorNotFound { path, .. } => vec![
                format!("{} no longer contains the expected marker", path.display()),
                "Restore the marker comment or re-run the plugin that created the file".into(),
            ],
            Self::PluginConfigInvalid { key, .. } => vec![format!(
                "Fix or remove the [plugins.\"{}\"] table in PROJECT",
                key
            )],
            Self::PhaseFailed { source, .. } => source.suggestions(),
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } | Self::StoreLockError => ErrorCategory::Internal,
            Self::FileExists { .. } | Self::AnchorNotFound { .. } | Self::ValidationFailed(_) => {
                ErrorCategory::Validation
            }
            Self::PluginConfigNotFound { .. } => ErrorCategory::NotFound,
            Self::PluginConfigInvalid { .. } => ErrorCategory::Configuration,
            Self::PhaseFailed { source, .. } => source.category(),
        }
    }
}
