//! Domain value objects: PluginVersion, ProjectVersion, Capability,
//! Operation, ExistsPolicy and Phase.
//!
//! These are pure value types with equality-by-value and no identity. Each
//! has a canonical string form and, where users type it, a `FromStr` parser.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

// ── PluginVersion ────────────────────────────────────────────────────────────

/// Release stage of a plugin version. Declaration order is the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Alpha,
    Beta,
    Stable,
}

impl Stage {
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Alpha => "-alpha",
            Self::Beta => "-beta",
            Self::Stable => "",
        }
    }
}

/// A plugin version token such as `v1`, `v2-alpha` or `v3-beta`.
///
/// Ordered by number first, then by stage (`alpha < beta < stable`), so
/// `v2-alpha > v1` and `v2 > v2-beta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginVersion {
    pub number: u64,
    pub stage: Stage,
}

impl PluginVersion {
    pub const fn new(number: u64, stage: Stage) -> Self {
        Self { number, stage }
    }

    pub const fn stable(number: u64) -> Self {
        Self::new(number, Stage::Stable)
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidVersion {
            version: s.to_string(),
            reason: reason.to_string(),
        };

        let rest = s
            .strip_prefix('v')
            .ok_or_else(|| invalid("must start with 'v'"))?;

        let (digits, stage) = match rest.split_once('-') {
            None => (rest, Stage::Stable),
            Some((digits, "alpha")) => (digits, Stage::Alpha),
            Some((digits, "beta")) => (digits, Stage::Beta),
            Some(_) => return Err(invalid("stage must be 'alpha' or 'beta'")),
        };

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected a version number after 'v'"));
        }
        let number: u64 = digits
            .parse()
            .map_err(|_| invalid("version number out of range"))?;
        if number == 0 {
            return Err(invalid("version number must be positive"));
        }

        Ok(Self { number, stage })
    }
}

impl Ord for PluginVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then(self.stage.cmp(&other.stage))
    }
}

impl PartialOrd for PluginVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}{}", self.number, self.stage.suffix())
    }
}

impl FromStr for PluginVersion {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ── ProjectVersion ───────────────────────────────────────────────────────────

/// Layout version of a scaffolded project. Opaque token, compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectVersion(String);

impl ProjectVersion {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidProjectVersion(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProjectVersion {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProjectVersion {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProjectVersion> for String {
    fn from(value: ProjectVersion) -> Self {
        value.0
    }
}

// ── Capability ───────────────────────────────────────────────────────────────

/// A role a plugin may or may not fulfil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Initializer,
    ApiCreator,
    WebhookCreator,
    Editor,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Self::Initializer,
        Self::ApiCreator,
        Self::WebhookCreator,
        Self::Editor,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initializer => "initializer",
            Self::ApiCreator => "api-creator",
            Self::WebhookCreator => "webhook-creator",
            Self::Editor => "editor",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Operation ────────────────────────────────────────────────────────────────

/// How many resolved plugins may provide the driven capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    ExactlyOne,
    AtLeastOne,
}

/// A command the engine can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    Init,
    CreateApi,
    CreateWebhook,
    Edit,
}

impl Operation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::CreateApi => "create api",
            Self::CreateWebhook => "create webhook",
            Self::Edit => "edit",
        }
    }

    pub const fn capability(self) -> Capability {
        match self {
            Self::Init => Capability::Initializer,
            Self::CreateApi => Capability::ApiCreator,
            Self::CreateWebhook => Capability::WebhookCreator,
            Self::Edit => Capability::Editor,
        }
    }

    /// Init must be driven by a single initializer; the others may chain.
    pub const fn cardinality(self) -> Cardinality {
        match self {
            Self::Init => Cardinality::ExactlyOne,
            _ => Cardinality::AtLeastOne,
        }
    }

    pub const fn requires_resource(self) -> bool {
        matches!(self, Self::CreateApi | Self::CreateWebhook)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ExistsPolicy ─────────────────────────────────────────────────────────────

/// What a template write does when its target path already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistsPolicy {
    /// Fail the run.
    #[default]
    Error,
    /// Leave the existing file untouched.
    Skip,
    /// Replace the existing content.
    Overwrite,
    /// Concatenate the body after the existing content.
    Append,
}

impl ExistsPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
            Self::Append => "append",
        }
    }
}

impl fmt::Display for ExistsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Phase ────────────────────────────────────────────────────────────────────

/// One step of the subcommand lifecycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    UpdateMetadata,
    BindFlags,
    ReadFlags,
    InjectConfig,
    InjectResource,
    PreScaffold,
    Scaffold,
    PostScaffold,
}

impl Phase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UpdateMetadata => "update-metadata",
            Self::BindFlags => "bind-flags",
            Self::ReadFlags => "read-flags",
            Self::InjectConfig => "inject-config",
            Self::InjectResource => "inject-resource",
            Self::PreScaffold => "pre-scaffold",
            Self::Scaffold => "scaffold",
            Self::PostScaffold => "post-scaffold",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
