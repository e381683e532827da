//! Plugin identity: `PluginKey` (`name/version`) and the looser
//! `PluginRequest` a user types, where the version may be omitted.

use crate::domain::error::DomainError;
use crate::domain::value_objects::PluginVersion;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Globally unique identity of a registry entry, e.g. `base.stratum.dev/v1`.
///
/// Ordering is by name, then by version, so sorted key sets group all
/// versions of one plugin together, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginKey {
    name: String,
    version: PluginVersion,
}

impl PluginKey {
    pub fn new(name: impl Into<String>, version: PluginVersion) -> Result<Self, DomainError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name, version })
    }

    /// Parse the canonical `name/version` form. The version is mandatory.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let request = PluginRequest::parse(s)?;
        match request.version {
            Some(version) => Ok(Self {
                name: request.name,
                version,
            }),
            None => Err(DomainError::InvalidPluginKey {
                key: s.to_string(),
                reason: "missing '/version' suffix".into(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> PluginVersion {
        self.version
    }

    /// First dot-separated segment of the name (`base` for `base.stratum.dev`).
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    /// Whether a user-typed name refers to this key, either by full name or
    /// by short name.
    pub fn matches_name(&self, requested: &str) -> bool {
        self.name == requested || self.short_name() == requested
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

impl FromStr for PluginKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PluginKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PluginKey> for String {
    fn from(key: PluginKey) -> Self {
        key.to_string()
    }
}

/// A plugin reference as requested by a caller: `name[/version]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRequest {
    pub name: String,
    pub version: Option<PluginVersion>,
}

impl PluginRequest {
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();
        let (name, version) = match s.split_once('/') {
            Some((name, version)) => (name, Some(version)),
            None => (s, None),
        };

        validate_name(name).map_err(|e| match e {
            DomainError::InvalidPluginKey { reason, .. } => DomainError::InvalidPluginKey {
                key: s.to_string(),
                reason,
            },
            other => other,
        })?;

        let version = version
            .map(|v| {
                PluginVersion::parse(v).map_err(|e| DomainError::InvalidPluginKey {
                    key: s.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            name: name.to_string(),
            version,
        })
    }

    /// Whether this request names `key` (full or short name, and exact
    /// version when one was given).
    pub fn matches(&self, key: &PluginKey) -> bool {
        key.matches_name(&self.name) && self.version.is_none_or(|v| v == key.version())
    }
}

impl fmt::Display for PluginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(version) => write!(f, "{}/{}", self.name, version),
            None => f.write_str(&self.name),
        }
    }
}

fn short_name(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidPluginKey {
        key: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if name.starts_with('.') || name.ends_with('.') || name.contains("..") {
        return Err(invalid("name has an empty dot-separated segment"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')))
    {
        return Err(invalid(&format!("invalid character '{c}'")));
    }
    Ok(())
}
