//! Resource descriptor (group / version / kind) and its derived naming forms.

use crate::domain::error::DomainError;
use heck::{ToKebabCase, ToSnakeCase};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Webhook types scaffolded for a resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Webhooks {
    pub defaulting: bool,
    pub validation: bool,
    pub conversion: bool,
}

impl Webhooks {
    pub fn is_empty(&self) -> bool {
        !(self.defaulting || self.validation || self.conversion)
    }

    pub fn merge(&mut self, other: Webhooks) {
        self.defaulting |= other.defaulting;
        self.validation |= other.validation;
        self.conversion |= other.conversion;
    }
}

/// An API resource identified by group, version and kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub group: String,
    pub version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
    #[serde(default, skip_serializing_if = "Webhooks::is_empty")]
    pub webhooks: Webhooks,
}

impl Resource {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            domain: String::new(),
            plural: None,
            webhooks: Webhooks::default(),
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    pub fn with_webhooks(mut self, webhooks: Webhooks) -> Self {
        self.webhooks = webhooks;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.group.is_empty() && !is_dns_label(&self.group) {
            return Err(DomainError::InvalidResource(format!(
                "group '{}' must be a lowercase DNS label",
                self.group
            )));
        }
        if !self.domain.is_empty() && !self.domain.split('.').all(is_dns_label) {
            return Err(DomainError::InvalidResource(format!(
                "domain '{}' must be a lowercase DNS name",
                self.domain
            )));
        }
        if !is_api_version(&self.version) {
            return Err(DomainError::InvalidResource(format!(
                "version '{}' must look like v1, v1alpha1 or v2beta3",
                self.version
            )));
        }
        if !is_pascal_kind(&self.kind) {
            return Err(DomainError::InvalidResource(format!(
                "kind '{}' must be PascalCase and alphanumeric",
                self.kind
            )));
        }
        if let Some(plural) = self.plural.as_deref().filter(|p| !is_dns_label(p)) {
            return Err(DomainError::InvalidResource(format!(
                "plural '{}' must be a lowercase DNS label",
                plural
            )));
        }
        Ok(())
    }

    /// Same group, version and kind (domain and webhooks ignored).
    pub fn same_gvk(&self, other: &Resource) -> bool {
        self.group == other.group && self.version == other.version && self.kind == other.kind
    }

    /// `group.domain`, or whichever half is non-empty.
    pub fn qualified_group(&self) -> String {
        match (self.group.is_empty(), self.domain.is_empty()) {
            (false, false) => format!("{}.{}", self.group, self.domain),
            (false, true) => self.group.clone(),
            (true, _) => self.domain.clone(),
        }
    }

    pub fn plural(&self) -> String {
        self.plural
            .clone()
            .unwrap_or_else(|| pluralize(&self.kind.to_lowercase()))
    }

    pub fn kind_lower(&self) -> String {
        self.kind.to_lowercase()
    }

    pub fn kind_snake(&self) -> String {
        self.kind.to_snake_case()
    }

    pub fn kind_kebab(&self) -> String {
        self.kind.to_kebab_case()
    }

    /// `group_` for named groups, empty for the core group.
    pub fn group_prefix(&self) -> String {
        if self.group.is_empty() {
            String::new()
        } else {
            format!("{}_", self.group)
        }
    }

    /// Manifest file stem: `batch_v1_cronjob`, or `v1_pod` for the core group.
    pub fn file_stem(&self) -> String {
        format!("{}{}_{}", self.group_prefix(), self.version, self.kind_lower())
    }

    /// Package identifier for the group; `core` for the empty group.
    pub fn group_package(&self) -> String {
        if self.group.is_empty() {
            return "core".to_string();
        }
        self.group
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = self.qualified_group();
        if group.is_empty() {
            write!(f, "{}/{}", self.version, self.kind)
        } else {
            write!(f, "{}/{}, Kind={}", group, self.version, self.kind)
        }
    }
}

/// Simple English pluralisation for lowercase kinds.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| word.ends_with(s)) {
        return format!("{word}es");
    }
    let consonant_y = word
        .strip_suffix('y')
        .filter(|stem| stem.chars().last().is_some_and(|c| !"aeiou".contains(c)));
    if let Some(stem) = consonant_y {
        return format!("{stem}ies");
    }
    format!("{word}s")
}

fn is_dns_label(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 63
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !s.starts_with('-')
        && !s.ends_with('-')
}

fn is_pascal_kind(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
        && s.len() <= 63
}

/// `v<N>` optionally followed by `alpha<M>` or `beta<M>`.
fn is_api_version(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('v') else {
        return false;
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (major, stage) = rest.split_at(digits_end);
    if major.is_empty() || major.starts_with('0') {
        return false;
    }
    if stage.is_empty() {
        return true;
    }
    let minor = stage
        .strip_prefix("alpha")
        .or_else(|| stage.strip_prefix("beta"));
    matches!(minor, Some(m) if !m.is_empty() && m.chars().all(|c| c.is_ascii_digit()))
}
