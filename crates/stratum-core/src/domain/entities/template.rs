//! Template value object and the `{{VAR}}` rendering context.
//!
//! A template is an opaque `(path, body, policy)` triple plus a handful of
//! optional data slots (boilerplate, project name, domain, resource,
//! multigroup). Plugins fill the slots they care about; the engine fills the
//! rest from [`TemplateDefaults`] in one `apply_defaults` step before the
//! path and body are resolved.
//!
//! ```text
//! Template ──apply_defaults(TemplateDefaults)──► resolve_path() ──► RelativePath
//!                                           └──► render_body()  ──► String
//! ```

use std::collections::BTreeMap;

use chrono::Datelike;
use heck::{ToKebabCase, ToSnakeCase, ToUpperCamelCase};

use crate::domain::entities::common::RelativePath;
use crate::domain::entities::resource::Resource;
use crate::domain::error::DomainError;
use crate::domain::value_objects::ExistsPolicy;

/// Project-wide values the engine supplies to every template that did not
/// set them itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateDefaults {
    pub boilerplate: Option<String>,
    pub project_name: Option<String>,
    pub domain: Option<String>,
    pub resource: Option<Resource>,
    pub multigroup: bool,
}

/// One file to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    path: String,
    multigroup_path: Option<String>,
    body: String,
    policy: ExistsPolicy,
    boilerplate: Option<String>,
    project_name: Option<String>,
    domain: Option<String>,
    resource: Option<Resource>,
    multigroup: Option<bool>,
    variables: BTreeMap<String, String>,
}

impl Template {
    pub fn new(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            multigroup_path: None,
            body: body.into(),
            policy: ExistsPolicy::default(),
            boilerplate: None,
            project_name: None,
            domain: None,
            resource: None,
            multigroup: None,
            variables: BTreeMap::new(),
        }
    }

    pub fn with_policy(mut self, policy: ExistsPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Alternate path used when the project is multigroup and the resource
    /// has a non-empty group.
    pub fn with_multigroup_path(mut self, path: impl Into<String>) -> Self {
        self.multigroup_path = Some(path.into());
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_boilerplate(mut self, boilerplate: impl Into<String>) -> Self {
        self.boilerplate = Some(boilerplate.into());
        self
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_multigroup(mut self, multigroup: bool) -> Self {
        self.multigroup = Some(multigroup);
        self
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn policy(&self) -> ExistsPolicy {
        self.policy
    }

    pub fn raw_path(&self) -> &str {
        &self.path
    }

    pub fn resource(&self) -> Option<&Resource> {
        self.resource.as_ref()
    }

    /// Fill every unset slot from `defaults`. Slots the template set
    /// explicitly win.
    pub fn apply_defaults(&mut self, defaults: &TemplateDefaults) {
        if self.boilerplate.is_none() {
            self.boilerplate.clone_from(&defaults.boilerplate);
        }
        if self.project_name.is_none() {
            self.project_name.clone_from(&defaults.project_name);
        }
        if self.domain.is_none() {
            self.domain.clone_from(&defaults.domain);
        }
        if self.resource.is_none() {
            self.resource.clone_from(&defaults.resource);
        }
        if self.multigroup.is_none() {
            self.multigroup = Some(defaults.multigroup);
        }
    }

    /// Substitute `%[..]` placeholders and validate the result.
    pub fn resolve_path(&self) -> Result<RelativePath, DomainError> {
        let raw = match (&self.multigroup_path, &self.resource) {
            (Some(mg), Some(res)) if self.multigroup.unwrap_or(false) && !res.group.is_empty() => {
                mg.as_str()
            }
            _ => self.path.as_str(),
        };

        let resolved = match &self.resource {
            Some(res) => replace_path_placeholders(raw, res),
            None => raw.to_string(),
        };

        if let Some(start) = resolved.find("%[") {
            let placeholder = match resolved[start..].find(']') {
                Some(end) => &resolved[start..start + end + 1],
                None => &resolved[start..],
            };
            return Err(DomainError::UnresolvedPlaceholder {
                path: raw.to_string(),
                placeholder: placeholder.to_string(),
            });
        }

        RelativePath::try_new(resolved)
    }

    pub fn render_body(&self) -> String {
        self.render_context().render(&self.body)
    }

    fn render_context(&self) -> RenderContext {
        let mut ctx = match &self.project_name {
            Some(name) => RenderContext::new(name),
            None => RenderContext::default(),
        };
        if let Some(domain) = &self.domain {
            ctx = ctx.with_variable("DOMAIN", domain);
        }
        if let Some(boilerplate) = &self.boilerplate {
            ctx = ctx.with_variable("BOILERPLATE", boilerplate);
        }
        if let Some(resource) = &self.resource {
            ctx = ctx.with_resource(resource);
        }
        for (key, value) in &self.variables {
            ctx = ctx.with_variable(key, value);
        }
        ctx
    }
}

/// Resolve `%[group]`, `%[group-prefix]`, `%[version]`, `%[kind]`,
/// `%[kind-snake]` and `%[plural]` against a resource.
pub fn replace_path_placeholders(path: &str, resource: &Resource) -> String {
    path.replace("%[group-prefix]", &resource.group_prefix())
        .replace("%[group]", &resource.group)
        .replace("%[version]", &resource.version)
        .replace("%[kind-snake]", &resource.kind_snake())
        .replace("%[kind]", &resource.kind_lower())
        .replace("%[plural]", &resource.plural())
}

/// Variables for `{{NAME}}` substitution.
///
/// ## Built-in Variables
///
/// | Variable | Example | Source |
/// |----------|---------|--------|
/// | `PROJECT_NAME` | "my operator" | project |
/// | `PROJECT_NAME_SNAKE` | "my_operator" | computed |
/// | `PROJECT_NAME_KEBAB` | "my-operator" | computed |
/// | `PROJECT_NAME_PASCAL` | "MyOperator" | computed |
/// | `KIND`, `KIND_LOWER`, `KIND_SNAKE`, `PLURAL` | "CronJob", "cronjob", "cron_job", "cronjobs" | resource |
/// | `GROUP`, `VERSION`, `QUALIFIED_GROUP`, `GROUP_PACKAGE` | "batch", "v1", "batch.example.com", "batch" | resource |
/// | `YEAR` | "2026" | system clock |
///
/// Unknown placeholders are left verbatim.
#[derive(Debug, Clone)]
pub struct RenderContext {
    variables: BTreeMap<String, String>,
}

impl Default for RenderContext {
    fn default() -> Self {
        let mut variables = BTreeMap::new();
        variables.insert(
            "YEAR".to_string(),
            chrono::Local::now().year().to_string(),
        );
        Self { variables }
    }
}

impl RenderContext {
    pub fn new(project_name: impl Into<String>) -> Self {
        let name = project_name.into();
        Self::default()
            .with_variable("PROJECT_NAME_SNAKE", name.to_snake_case())
            .with_variable("PROJECT_NAME_KEBAB", name.to_kebab_case())
            .with_variable("PROJECT_NAME_PASCAL", name.to_upper_camel_case())
            .with_variable("PROJECT_NAME", name)
    }

    pub fn with_resource(self, resource: &Resource) -> Self {
        self.with_variable("GROUP", &resource.group)
            .with_variable("VERSION", &resource.version)
            .with_variable("KIND", &resource.kind)
            .with_variable("KIND_LOWER", resource.kind_lower())
            .with_variable("KIND_SNAKE", resource.kind_snake())
            .with_variable("PLURAL", resource.plural())
            .with_variable("QUALIFIED_GROUP", resource.qualified_group())
            .with_variable("GROUP_PACKAGE", resource.group_package())
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Replace `{{KEY}}` placeholders in a single left-to-right pass.
    /// Substituted values are never re-scanned.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let value = after
                .find("}}")
                .and_then(|close| self.get(&after[..close]).map(|v| (v, close)));
            match value {
                Some((value, close)) => {
                    out.push_str(value);
                    rest = &after[close + 2..];
                }
                None => {
                    out.push('{');
                    rest = &rest[open + 1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}
