//! `manifests.stratum.dev/v1`: sample, CRD and webhook manifests.

use std::path::Path;

use tracing::debug;

use stratum_core::application::ApplicationError;
use stratum_core::application::plugin::{
    ApiCreator, CliMetadata, Plugin, Subcommand, SubcommandMetadata, WebhookCreator,
};
use stratum_core::application::ports::{Filesystem, ProjectConfig};
use stratum_core::application::{MarkerPatcher, TemplateWriter, project_defaults};
use stratum_core::domain::{
    ExistsPolicy, FlagSet, PluginKey, ProjectVersion, Resource, Stage, Template, TemplateDefaults,
    Webhooks,
};
use stratum_core::error::StratumResult;

use super::{plugin_key, supported_versions};

pub(crate) const DEFAULT_KUSTOMIZATION: &str = "config/default/kustomization.yaml";

/// Commented-out block in the default kustomization that enabling a webhook
/// uncomments.
pub(crate) const WEBHOOK_BLOCK: &str = "#- ../webhook\n#- ../certmanager\n";

const DEFAULT_KUSTOMIZATION_BODY: &str = "\
namePrefix: {{PROJECT_NAME_KEBAB}}-

resources:
- ../crd
- ../rbac
- ../manager
# Uncommented when the first webhook is scaffolded.
#- ../webhook
#- ../certmanager
";

const SAMPLES_HEADER: &str = "\
## Append samples of your project ##
resources:
";

const SAMPLES_KUSTOMIZATION: &str = "config/samples/kustomization.yaml";

const SAMPLE: &str = "\
apiVersion: {{QUALIFIED_GROUP}}/{{VERSION}}
kind: {{KIND}}
metadata:
  labels:
    app.kubernetes.io/name: {{PROJECT_NAME_KEBAB}}
    app.kubernetes.io/managed-by: stratum
  name: {{KIND_LOWER}}-sample
spec:
  # Add fields here
";

const CRD: &str = "\
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: {{PLURAL}}.{{QUALIFIED_GROUP}}
spec:
  group: {{QUALIFIED_GROUP}}
  names:
    kind: {{KIND}}
    plural: {{PLURAL}}
  scope: Namespaced
";

const WEBHOOK_HEADER: &str = "\
resources:
";

const WEBHOOK_KUSTOMIZATION: &str = "config/webhook/kustomization.yaml";

const WEBHOOK: &str = "\
apiVersion: admissionregistration.k8s.io/v1
kind: {{WEBHOOK_KIND}}
metadata:
  name: {{KIND_LOWER}}-{{WEBHOOK_NAME}}
webhooks:
- name: {{WEBHOOK_NAME}}.{{KIND_LOWER}}.{{QUALIFIED_GROUP}}
  rules:
  - apiGroups: [\"{{QUALIFIED_GROUP}}\"]
    apiVersions: [\"{{VERSION}}\"]
    resources: [\"{{PLURAL}}\"]
    operations: [\"CREATE\", \"UPDATE\"]
";

const CONVERSION_PATCH: &str = "\
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: {{PLURAL}}.{{QUALIFIED_GROUP}}
spec:
  conversion:
    strategy: Webhook
    webhook:
      clientConfig:
        service:
          namespace: system
          name: webhook-service
          path: /convert
      conversionReviewVersions:
      - v1
";

pub struct ManifestsPlugin {
    key: PluginKey,
    versions: Vec<ProjectVersion>,
}

impl ManifestsPlugin {
    pub fn new() -> StratumResult<Self> {
        Ok(Self {
            key: Self::key()?,
            versions: supported_versions()?,
        })
    }

    pub fn key() -> StratumResult<PluginKey> {
        plugin_key("manifests.stratum.dev", 1, Stage::Stable)
    }
}

impl Plugin for ManifestsPlugin {
    fn key(&self) -> &PluginKey {
        &self.key
    }

    fn supported_project_versions(&self) -> &[ProjectVersion] {
        &self.versions
    }

    fn as_api_creator(&self) -> Option<&dyn ApiCreator> {
        Some(self)
    }

    fn as_webhook_creator(&self) -> Option<&dyn WebhookCreator> {
        Some(self)
    }
}

impl ApiCreator for ManifestsPlugin {
    fn create_api_subcommand(&self) -> Box<dyn Subcommand> {
        Box::new(CreateApiSubcommand::default())
    }
}

impl WebhookCreator for ManifestsPlugin {
    fn create_webhook_subcommand(&self) -> Box<dyn Subcommand> {
        Box::new(CreateWebhookSubcommand::default())
    }
}

fn prepared_defaults(defaults: &TemplateDefaults, resource: Option<&Resource>) -> TemplateDefaults {
    let mut defaults = defaults.clone();
    defaults.resource = resource.cloned();
    defaults
}

/// Append `entry` to a kustomization resource list unless it is already there.
fn list_once(fs: &dyn Filesystem, file: &str, entry: &str) -> StratumResult<()> {
    if MarkerPatcher::new(fs).has_fragment(Path::new(file), entry)? {
        debug!(path = file, entry = entry.trim_end(), "already listed");
        return Ok(());
    }
    TemplateWriter::new(fs)
        .execute([Template::new(file, entry).with_policy(ExistsPolicy::Append)])?;
    Ok(())
}

/// One admission configuration document per enabled webhook type.
fn webhook_documents(webhooks: Webhooks) -> String {
    let mut documents = Vec::new();
    if webhooks.defaulting {
        documents.push(webhook_document("MutatingWebhookConfiguration", "mutating"));
    }
    if webhooks.validation {
        documents.push(webhook_document("ValidatingWebhookConfiguration", "validating"));
    }
    documents.join("---\n")
}

fn webhook_document(kind: &str, name: &str) -> String {
    WEBHOOK
        .replace("{{WEBHOOK_KIND}}", kind)
        .replace("{{WEBHOOK_NAME}}", name)
}

// ── create api ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct CreateApiSubcommand {
    force: bool,
    defaults: TemplateDefaults,
    resource: Option<Resource>,
}

impl Subcommand for CreateApiSubcommand {
    fn update_metadata(&self, cli: &CliMetadata, meta: &mut SubcommandMetadata) {
        meta.description = "Scaffold the CRD and a sample manifest for a new API.".into();
        meta.examples = format!(
            "  {} create api --group batch --version v1 --kind CronJob",
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
        Ok(())
    }

    fn inject_resource(&mut self, resource: &mut Resource) -> StratumResult<()> {
        self.resource = Some(resource.clone());
        Ok(())
    }

    fn scaffold(
        &mut self,
        fs: &dyn Filesystem,
        _config: &mut dyn ProjectConfig,
    ) -> StratumResult<()> {
        let policy = if self.force {
            ExistsPolicy::Overwrite
        } else {
            ExistsPolicy::Error
        };

        let Some(resource) = &self.resource else {
            return Ok(());
        };

        TemplateWriter::new(fs)
            .with_defaults(prepared_defaults(&self.defaults, Some(resource)))
            .execute([
                Template::new("config/crd/bases/%[group-prefix]%[plural].yaml", CRD)
                    .with_policy(policy),
                Template::new(
                    "config/samples/%[group-prefix]%[version]_%[kind].yaml",
                    SAMPLE,
                )
                .with_policy(policy),
                Template::new(SAMPLES_KUSTOMIZATION, SAMPLES_HEADER)
                    .with_policy(ExistsPolicy::Skip),
                Template::new(DEFAULT_KUSTOMIZATION, DEFAULT_KUSTOMIZATION_BODY)
                    .with_policy(ExistsPolicy::Skip),
            ])?;

        list_once(
            fs,
            SAMPLES_KUSTOMIZATION,
            &format!("- {}.yaml\n", resource.file_stem()),
        )
    }
}

// ── create webhook ───────────────────────────────────────────────────────────

#[derive(Default)]
struct CreateWebhookSubcommand {
    defaults: TemplateDefaults,
    known: Vec<Resource>,
    resource: Option<Resource>,
}

impl Subcommand for CreateWebhookSubcommand {
    fn update_metadata(&self, cli: &CliMetadata, meta: &mut SubcommandMetadata) {
        meta.description = "Scaffold admission webhook manifests for an existing API.".into();
        meta.examples = format!(
            "  {} create webhook --group batch --version v1 --kind CronJob --defaulting",
            cli.command_name
        );
    }

    fn inject_config(&mut self, config: &dyn ProjectConfig) -> StratumResult<()> {
        self.defaults = project_defaults(config);
        self.known = config.resources().to_vec();
        Ok(())
    }

    fn inject_resource(&mut self, resource: &mut Resource) -> StratumResult<()> {
        if resource.webhooks.is_empty() {
            return Err(ApplicationError::ValidationFailed(
                "at least one of --defaulting, --validation or --conversion is required".into(),
            )
            .into());
        }
        let Some(known) = self.known.iter().find(|r| r.same_gvk(resource)) else {
            return Err(ApplicationError::ValidationFailed(format!(
                "API {} has not been created; run create api first",
                resource
            ))
            .into());
        };

        // Manifests cover every webhook type scaffolded so far, not only this request's.
        let mut merged = resource.clone();
        merged.webhooks.merge(known.webhooks);
        self.resource = Some(merged);
        Ok(())
    }

    fn pre_scaffold(&mut self, fs: &dyn Filesystem) -> StratumResult<()> {
        if !fs.exists(Path::new(DEFAULT_KUSTOMIZATION)) {
            return Err(ApplicationError::ValidationFailed(format!(
                "{DEFAULT_KUSTOMIZATION} is missing"
            ))
            .into());
        }
        Ok(())
    }

    fn scaffold(
        &mut self,
        fs: &dyn Filesystem,
        _config: &mut dyn ProjectConfig,
    ) -> StratumResult<()> {
        let Some(resource) = &self.resource else {
            return Ok(());
        };

        let admission = resource.webhooks.defaulting || resource.webhooks.validation;
        let mut templates = Vec::new();
        if admission {
            templates.push(
                Template::new(
                    "config/webhook/%[group-prefix]%[version]_%[kind]_webhook.yaml",
                    webhook_documents(resource.webhooks),
                )
                .with_policy(ExistsPolicy::Overwrite),
            );
            templates.push(
                Template::new(WEBHOOK_KUSTOMIZATION, WEBHOOK_HEADER)
                    .with_policy(ExistsPolicy::Skip),
            );
        }
        if resource.webhooks.conversion {
            templates.push(
                Template::new("config/crd/patches/webhook_in_%[plural].yaml", CONVERSION_PATCH)
                    .with_policy(ExistsPolicy::Skip),
            );
        }

        TemplateWriter::new(fs)
            .with_defaults(prepared_defaults(&self.defaults, self.resource.as_ref()))
            .execute(templates)?;
        if admission {
            list_once(
                fs,
                WEBHOOK_KUSTOMIZATION,
                &format!("- {}_webhook.yaml\n", resource.file_stem()),
            )?;
        }

        let patcher = MarkerPatcher::new(fs);
        let kustomization = Path::new(DEFAULT_KUSTOMIZATION);
        if patcher.has_fragment(kustomization, WEBHOOK_BLOCK)? {
            patcher.uncomment(kustomization, WEBHOOK_BLOCK, "#")?;
        } else {
            debug!(path = DEFAULT_KUSTOMIZATION, "webhook block already enabled");
        }
        Ok(())
    }
}
