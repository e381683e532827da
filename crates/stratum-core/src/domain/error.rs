// ============================================================================
// domain/error.rs - RESOLUTION AND VALIDATION ERRORS
// ============================================================================

use thiserror::Error;

use crate::domain::value_objects::Capability;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (reports keep a copy of the failure)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("Invalid plugin key '{key}': {reason}")]
    InvalidPluginKey { key: String, reason: String },

    #[error("Invalid plugin version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("Invalid project version '{0}'")]
    InvalidProjectVersion(String),

    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Path '{path}' contains placeholder '{placeholder}' that cannot be resolved")]
    UnresolvedPlaceholder { path: String, placeholder: String },

    #[error("Invalid flag '--{name}': {reason}")]
    InvalidFlag { name: String, reason: String },

    #[error("Bundle '{bundle}' has no members")]
    EmptyBundle { bundle: String },

    // ========================================================================
    // Registry Errors
    // ========================================================================
    #[error("Plugin key '{key}' is already registered")]
    DuplicateKey { key: String },

    #[error("Bundle '{bundle}' is cyclic: {}", cycle.join(" -> "))]
    CyclicBundle { bundle: String, cycle: Vec<String> },

    // ========================================================================
    // Not Found Errors (404-level equivalent)
    // ========================================================================
    #[error("No plugin found for '{key}': {reason}")]
    NotFound { key: String, reason: String },

    #[error("Ambiguous plugin '{key}', candidates: {}", candidates.join(", "))]
    AmbiguousPlugin { key: String, candidates: Vec<String> },

    // ========================================================================
    // Compatibility Errors (409-level equivalent)
    // ========================================================================
    #[error(
        "Plugin '{plugin}' does not support project version '{project_version}' (supported: {})",
        supported.join(", ")
    )]
    UnsupportedVersion {
        plugin: String,
        project_version: String,
        supported: Vec<String>,
    },

    #[error("No resolved plugin provides the {capability} capability required by '{operation}'")]
    MissingCapability {
        capability: Capability,
        operation: String,
    },

    #[error(
        "Duplicate {capability} plugins ({first}, {second}), use a more specific plugin key"
    )]
    DuplicateCapability {
        capability: Capability,
        first: String,
        second: String,
    },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidPluginKey { .. } => vec![
                "Plugin keys look like name[.domain]/version".into(),
                "Example: base.stratum.dev/v1".into(),
            ],
            Self::InvalidVersion { .. } => vec![
                "Plugin versions look like v1, v2-alpha or v3-beta".into(),
            ],
            Self::NotFound { key, .. } => vec![
                format!("No registered plugin matches '{}'", key),
                "Try: stratum list".into(),
                "Deprecated plugins must be requested with an explicit version".into(),
            ],
            Self::AmbiguousPlugin { candidates, .. } => vec![
                "Several plugins match; pass the full key instead".into(),
                format!("Candidates: {}", candidates.join(", ")),
            ],
            Self::CyclicBundle { bundle, .. } => vec![
                format!("Bundle '{}' includes itself through its members", bundle),
                "Remove the back-reference from one of the bundles".into(),
            ],
            Self::UnsupportedVersion { supported, .. } => vec![
                format!("Supported project versions: {}", supported.join(", ")),
                "Pass --project-version or pick another plugin".into(),
            ],
            Self::MissingCapability { capability, .. } => vec![
                format!("Add a plugin that provides the {} capability", capability),
                "Try: stratum list".into(),
            ],
            Self::DuplicateCapability { first, second, .. } => vec![
                format!("Both '{}' and '{}' provide this capability", first, second),
                "Remove one of them from --plugins".into(),
            ],
            Self::InvalidResource(msg) => vec![
                format!("Details: {}", msg),
                "Example: --group ship --version v1beta1 --kind Frigate".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidPluginKey { .. }
            | Self::InvalidVersion { .. }
            | Self::InvalidProjectVersion(_)
            | Self::InvalidResource(_)
            | Self::InvalidPath { .. }
            | Self::InvalidFlag { .. }
            | Self::UnresolvedPlaceholder { .. }
            | Self::AmbiguousPlugin { .. }
            | Self::MissingCapability { .. }
            | Self::DuplicateCapability { .. } => ErrorCategory::Validation,
            Self::UnsupportedVersion { .. } => ErrorCategory::Compatibility,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::DuplicateKey { .. } | Self::CyclicBundle { .. } | Self::EmptyBundle { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Internal,
}
