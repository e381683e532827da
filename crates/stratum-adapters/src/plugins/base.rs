//! `base.stratum.dev/v1`: project skeleton, API type files, layout edits.

use tracing::{debug, info};

use stratum_core::application::ApplicationError;
use stratum_core::application::plugin::{
    ApiCreator, CliMetadata, Editor, Initializer, Plugin, Subcommand, SubcommandMetadata,
};
use stratum_core::application::ports::{Filesystem, ProjectConfig};
use stratum_core::application::services::{TemplateWriter, project_defaults};
use stratum_core::domain::{
    ExistsPolicy, FlagSet, PluginKey, ProjectVersion, RenderContext, Resource, Stage, Template,
    TemplateDefaults,
};
use stratum_core::error::StratumResult;

use super::{
    BOILERPLATE_PATH, GITIGNORE_MARKER, MAKEFILE_VARS_MARKER, plugin_key, read_boilerplate,
    supported_versions,
};

const DEFAULT_OWNER: &str = "The Stratum Authors";

const BOILERPLATE: &str = "\
/*
Copyright {{YEAR}} {{OWNER}}.

Licensed under the Apache License, Version 2.0 (the \"License\");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an \"AS IS\" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/";

const README: &str = "\
# {{PROJECT_NAME}}

Scaffolded with stratum. Resources live under `api/`, manifests under
`config/`.

## Getting Started

```sh
make build
```
";

const MAKEFILE: &str = "\
# Image URL to use all building/pushing image targets
IMG ?= {{PROJECT_NAME_KEBAB}}:latest
{{VARS_MARKER}}

.PHONY: all
all: build

##@ General

.PHONY: help
help: ## Display this help.
\t@awk 'BEGIN {FS = \":.*##\"} /^[a-zA-Z_0-9-]+:.*?##/ { printf \"  %-15s %s\\n\", $$1, $$2 }' $(MAKEFILE_LIST)

##@ Build

.PHONY: build
build: ## Build the manager binary.
\tgo build -o bin/manager cmd/main.go
";

const GITIGNORE: &str = "\
# Binaries
bin/
*.exe

# Editor files
.idea/
.vscode/
*.swp
{{GITIGNORE_MARKER}}
";

const GROUP_INFO: &str = "\
{{BOILERPLATE}}

// Package {{VERSION}} contains API Schema definitions for the {{GROUP_PACKAGE}} {{VERSION}} API group.
// +groupName={{QUALIFIED_GROUP}}
package {{VERSION}}

// GroupVersion is group version used to register these objects.
var GroupVersion = schema.GroupVersion{Group: \"{{QUALIFIED_GROUP}}\", Version: \"{{VERSION}}\"}
";

const TYPES: &str = "\
{{BOILERPLATE}}

package {{VERSION}}

// {{KIND}}Spec defines the desired state of {{KIND}}.
type {{KIND}}Spec struct {
}

// {{KIND}}Status defines the observed state of {{KIND}}.
type {{KIND}}Status struct {
}

// +kubebuilder:object:root=true
// +kubebuilder:resource:path={{PLURAL}}

// {{KIND}} is the Schema for the {{PLURAL}} API.
type {{KIND}} struct {
\tSpec   {{KIND}}Spec   `json:\"spec,omitempty\"`
\tStatus {{KIND}}Status `json:\"status,omitempty\"`
}
";

/// Persisted under this plugin's key in the project file.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BaseConfig {
    owner: String,
}

pub struct BasePlugin {
    key: PluginKey,
    versions: Vec<ProjectVersion>,
}

impl BasePlugin {
    pub fn new() -> StratumResult<Self> {
        Ok(Self {
            key: Self::key()?,
            versions: supported_versions()?,
        })
    }

    pub fn key() -> StratumResult<PluginKey> {
        plugin_key("base.stratum.dev", 1, Stage::Stable)
    }
}

impl Plugin for BasePlugin {
    fn key(&self) -> &PluginKey {
        &self.key
    }

    fn supported_project_versions(&self) -> &[ProjectVersion] {
        &self.versions
    }

    fn as_initializer(&self) -> Option<&dyn Initializer> {
        Some(self)
    }

    fn as_api_creator(&self) -> Option<&dyn ApiCreator> {
        Some(self)
    }

    fn as_editor(&self) -> Option<&dyn Editor> {
        Some(self)
    }
}

impl Initializer for BasePlugin {
    fn init_subcommand(&self) -> Box<dyn Subcommand> {
        Box::new(InitSubcommand {
            key: self.key.clone(),
            owner: String::new(),
            defaults: TemplateDefaults::default(),
        })
    }
}

impl ApiCreator for BasePlugin {
    fn create_api_subcommand(&self) -> Box<dyn Subcommand> {
        Box::new(CreateApiSubcommand::default())
    }
}

impl Editor for BasePlugin {
    fn edit_subcommand(&self) -> Box<dyn Subcommand> {
        Box::new(EditSubcommand::default())
    }
}

// ── init ─────────────────────────────────────────────────────────────────────

struct InitSubcommand {
    key: PluginKey,
    owner: String,
    defaults: TemplateDefaults,
}

impl Subcommand for InitSubcommand {
    fn update_metadata(&self, cli: &CliMetadata, meta: &mut SubcommandMetadata) {
        meta.description = "Initialize a new project with a README, Makefile, \
                            license boilerplate and .gitignore."
            .into();
        meta.examples = format!(
            "  {} init --project-name guestbook --domain example.com -- --owner \"ACME Inc.\"",
            cli.command_name
        );
    }

    fn bind_flags(&self, flags: &mut FlagSet) {
        flags.string("owner", DEFAULT_OWNER, "owner named in the copyright header");
    }

    fn read_flags(&mut self, flags: &FlagSet) -> StratumResult<()> {
        self.owner = flags.get_string("owner").unwrap_or(DEFAULT_OWNER).to_string();
        Ok(())
    }

    fn inject_config(&mut self, config: &dyn ProjectConfig) -> StratumResult<()> {
        if config.project_name().is_none() {
            return Err(ApplicationError::ValidationFailed(
                "project name is not set; pass --project-name".into(),
            )
            .into());
        }
        self.defaults = project_defaults(config);
        Ok(())
    }

    fn pre_scaffold(&mut self, fs: &dyn Filesystem) -> StratumResult<()> {
        for existing in ["Makefile", BOILERPLATE_PATH] {
            if fs.exists(std::path::Path::new(existing)) {
                return Err(ApplicationError::ValidationFailed(format!(
                    "{existing} already exists; init expects a fresh directory"
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
        let boilerplate = RenderContext::default()
            .with_variable("OWNER", &self.owner)
            .render(BOILERPLATE);

        let mut defaults = self.defaults.clone();
        defaults.boilerplate = Some(boilerplate.clone());

        TemplateWriter::new(fs).with_defaults(defaults).execute([
            Template::new(BOILERPLATE_PATH, boilerplate),
            Template::new("README.md", README),
            Template::new("Makefile", MAKEFILE)
                .with_variable("VARS_MARKER", MAKEFILE_VARS_MARKER.trim_end()),
            Template::new(".gitignore", GITIGNORE)
                .with_variable("GITIGNORE_MARKER", GITIGNORE_MARKER.trim_end()),
        ])?;

        config.encode_plugin_config(
            &self.key,
            &BaseConfig {
                owner: self.owner.clone(),
            },
        )?;
        Ok(())
    }
}

// ── create api ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct CreateApiSubcommand {
    force: bool,
    defaults: TemplateDefaults,
    known: Vec<Resource>,
    resource: Option<Resource>,
}

impl Subcommand for CreateApiSubcommand {
    fn update_metadata(&self, cli: &CliMetadata, meta: &mut SubcommandMetadata) {
        meta.description = "Scaffold the Go type definitions for a new API.".into();
        meta.examples = format!(
            "  {} create api --group ship --version v1beta1 --kind Frigate",
            cli.command_name
        );
    }

    fn bind_flags(&self, flags: &mut FlagSet) {
        flags.bool("force", false, "overwrite files that already exist");
    }

    fn read_flags(&mut self, flags: &FlagSet) -> StratumResult<()> {
        self.force = flags.get_bool("force");
        Ok(())
    }

    fn inject_config(&mut self, config: &dyn ProjectConfig) -> StratumResult<()> {
        self.defaults = project_defaults(config);
        self.known = config.resources().to_vec();
        Ok(())
    }

    fn inject_resource(&mut self, resource: &mut Resource) -> StratumResult<()> {
        if !self.force && self.known.iter().any(|r| r.same_gvk(resource)) {
            return Err(ApplicationError::ValidationFailed(format!(
                "API {} already exists; pass --force to regenerate it",
                resource
            ))
            .into());
        }
        self.resource = Some(resource.clone());
        Ok(())
    }

    fn scaffold(
        &mut self,
        fs: &dyn Filesystem,
        _config: &mut dyn ProjectConfig,
    ) -> StratumResult<()> {
        let mut defaults = self.defaults.clone();
        defaults.boilerplate = read_boilerplate(fs)?;
        defaults.resource = self.resource.clone();

        let policy = if self.force {
            ExistsPolicy::Overwrite
        } else {
            ExistsPolicy::Error
        };

        TemplateWriter::new(fs).with_defaults(defaults).execute([
            Template::new("api/%[version]/groupversion_info.go", GROUP_INFO)
                .with_multigroup_path("api/%[group]/%[version]/groupversion_info.go")
                .with_policy(ExistsPolicy::Skip),
            Template::new("api/%[version]/%[kind-snake]_types.go", TYPES)
                .with_multigroup_path("api/%[group]/%[version]/%[kind-snake]_types.go")
                .with_policy(policy),
        ])?;
        Ok(())
    }
}

// ── edit ─────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct EditSubcommand {
    multigroup: Option<bool>,
    current: bool,
    groups: Vec<String>,
}

impl Subcommand for EditSubcommand {
    fn update_metadata(&self, cli: &CliMetadata, meta: &mut SubcommandMetadata) {
        meta.description = "Change the project layout.".into();
        meta.examples = format!("  {} edit -- --multigroup", cli.command_name);
    }

    fn bind_flags(&self, flags: &mut FlagSet) {
        flags.bool("multigroup", false, "lay out APIs as api/<group>/<version>");
    }

    fn read_flags(&mut self, flags: &FlagSet) -> StratumResult<()> {
        self.multigroup = flags
            .is_set("multigroup")
            .then(|| flags.get_bool("multigroup"));
        Ok(())
    }

    fn inject_config(&mut self, config: &dyn ProjectConfig) -> StratumResult<()> {
        self.current = config.is_multigroup();
        self.groups = config.resources().iter().map(|r| r.group.clone()).collect();
        self.groups.sort();
        self.groups.dedup();
        Ok(())
    }

    fn pre_scaffold(&mut self, _fs: &dyn Filesystem) -> StratumResult<()> {
        if self.multigroup == Some(false) && self.current && self.groups.len() > 1 {
            return Err(ApplicationError::ValidationFailed(format!(
                "cannot leave the multigroup layout with APIs in {} groups",
                self.groups.len()
            ))
            .into());
        }
        Ok(())
    }

    fn scaffold(
        &mut self,
        _fs: &dyn Filesystem,
        config: &mut dyn ProjectConfig,
    ) -> StratumResult<()> {
        match self.multigroup {
            Some(wanted) if wanted != self.current => {
                config.set_multigroup(wanted);
                info!(multigroup = wanted, "project layout changed");
            }
            _ => debug!("layout unchanged"),
        }
        Ok(())
    }
}
