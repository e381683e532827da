//! Shared fixtures: an in-memory filesystem, an in-memory project config and
//! a configurable test plugin that records its lifecycle.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use stratum_core::application::{ApplicationError, project_defaults};
use stratum_core::domain::Phase;
use stratum_core::prelude::*;

pub fn v3() -> ProjectVersion {
    ProjectVersion::new("3").unwrap()
}

pub fn key(s: &str) -> PluginKey {
    PluginKey::parse(s).unwrap()
}

// ── MemFs ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemFs {
    files: RwLock<BTreeMap<PathBuf, String>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(PathBuf::from(path), content.to_string());
        self
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.files.read().unwrap().get(Path::new(path)).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.files
            .read()
            .unwrap()
            .keys()
            .map(|p| p.display().to_string())
            .collect()
    }
}

impl Filesystem for MemFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }

    fn read_file(&self, path: &Path) -> StratumResult<String> {
        self.files.read().unwrap().get(path).cloned().ok_or_else(|| {
            ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "no such file".into(),
            }
            .into()
        })
    }

    fn write_file(&self, path: &Path, content: &str, mode: WriteMode) -> StratumResult<()> {
        let mut files = self.files.write().unwrap();
        match mode {
            WriteMode::CreateNew if files.contains_key(path) => {
                return Err(ApplicationError::FileExists {
                    path: path.to_path_buf(),
                }
                .into());
            }
            WriteMode::Append => {
                files
                    .entry(path.to_path_buf())
                    .or_default()
                    .push_str(content);
            }
            _ => {
                files.insert(path.to_path_buf(), content.to_string());
            }
        }
        Ok(())
    }

    fn create_dir_all(&self, _path: &Path) -> StratumResult<()> {
        Ok(())
    }
}

// ── MemConfig ────────────────────────────────────────────────────────────────

pub struct MemConfig {
    pub version: ProjectVersion,
    pub project_name: Option<String>,
    pub domain: Option<String>,
    pub multigroup: bool,
    pub layout: Vec<PluginKey>,
    pub resources: Vec<Resource>,
    pub plugins: BTreeMap<String, serde_json::Value>,
}

impl MemConfig {
    pub fn new() -> Self {
        Self {
            version: v3(),
            project_name: Some("demo".into()),
            domain: Some("example.com".into()),
            multigroup: false,
            layout: Vec::new(),
            resources: Vec::new(),
            plugins: BTreeMap::new(),
        }
    }
}

impl ProjectConfig for MemConfig {
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
            Some(existing) => existing.webhooks.merge(resource.webhooks),
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

// ── TestPlugin ───────────────────────────────────────────────────────────────

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// A plugin whose subcommands write fixed templates and patches, and log
/// every lifecycle phase as `"<key>:<phase>"`.
#[derive(Clone)]
pub struct TestPlugin {
    key: PluginKey,
    versions: Vec<ProjectVersion>,
    deprecation: Option<String>,
    capabilities: Vec<Capability>,
    templates: Vec<Template>,
    patches: Vec<AnchorPatch>,
    flags: Vec<String>,
    fail_at: Option<Phase>,
    write_in_pre_scaffold: bool,
    log: Log,
}

impl TestPlugin {
    pub fn new(k: &str, capabilities: &[Capability]) -> Self {
        Self {
            key: key(k),
            versions: vec![v3()],
            deprecation: None,
            capabilities: capabilities.to_vec(),
            templates: Vec::new(),
            patches: Vec::new(),
            flags: Vec::new(),
            fail_at: None,
            write_in_pre_scaffold: false,
            log: new_log(),
        }
    }

    pub fn versions(mut self, versions: &[&str]) -> Self {
        self.versions = versions
            .iter()
            .map(|v| ProjectVersion::new(*v).unwrap())
            .collect();
        self
    }

    pub fn deprecated(mut self, message: &str) -> Self {
        self.deprecation = Some(message.to_string());
        self
    }

    pub fn template(mut self, template: Template) -> Self {
        self.templates.push(template);
        self
    }

    pub fn patch(mut self, patch: AnchorPatch) -> Self {
        self.patches.push(patch);
        self
    }

    pub fn flag(mut self, name: &str) -> Self {
        self.flags.push(name.to_string());
        self
    }

    pub fn fail_at(mut self, phase: Phase) -> Self {
        self.fail_at = Some(phase);
        self
    }

    pub fn write_in_pre_scaffold(mut self) -> Self {
        self.write_in_pre_scaffold = true;
        self
    }

    pub fn log(mut self, log: &Log) -> Self {
        self.log = Arc::clone(log);
        self
    }

    fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    fn subcommand(&self) -> Box<dyn Subcommand> {
        Box::new(TestSubcommand {
            plugin: self.clone(),
            defaults: TemplateDefaults::default(),
        })
    }
}

impl Plugin for TestPlugin {
    fn key(&self) -> &PluginKey {
        &self.key
    }

    fn supported_project_versions(&self) -> &[ProjectVersion] {
        &self.versions
    }

    fn deprecation(&self) -> Option<&str> {
        self.deprecation.as_deref()
    }

    fn as_initializer(&self) -> Option<&dyn Initializer> {
        self.has(Capability::Initializer)
            .then_some(self as &dyn Initializer)
    }

    fn as_api_creator(&self) -> Option<&dyn ApiCreator> {
        self.has(Capability::ApiCreator)
            .then_some(self as &dyn ApiCreator)
    }

    fn as_webhook_creator(&self) -> Option<&dyn WebhookCreator> {
        self.has(Capability::WebhookCreator)
            .then_some(self as &dyn WebhookCreator)
    }

    fn as_editor(&self) -> Option<&dyn Editor> {
        self.has(Capability::Editor).then_some(self as &dyn Editor)
    }
}

impl Initializer for TestPlugin {
    fn init_subcommand(&self) -> Box<dyn Subcommand> {
        self.subcommand()
    }
}

impl ApiCreator for TestPlugin {
    fn create_api_subcommand(&self) -> Box<dyn Subcommand> {
        self.subcommand()
    }
}

impl WebhookCreator for TestPlugin {
    fn create_webhook_subcommand(&self) -> Box<dyn Subcommand> {
        self.subcommand()
    }
}

impl Editor for TestPlugin {
    fn edit_subcommand(&self) -> Box<dyn Subcommand> {
        self.subcommand()
    }
}

struct TestSubcommand {
    plugin: TestPlugin,
    defaults: TemplateDefaults,
}

impl TestSubcommand {
    fn record(&self, phase: Phase) -> StratumResult<()> {
        self.plugin
            .log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.plugin.key, phase));
        if self.plugin.fail_at == Some(phase) {
            return Err(ApplicationError::ValidationFailed(format!("{phase} rejected")).into());
        }
        Ok(())
    }
}

impl Subcommand for TestSubcommand {
    fn update_metadata(&self, cli: &CliMetadata, meta: &mut SubcommandMetadata) {
        meta.description = format!("{} test plugin", self.plugin.key);
        meta.examples = format!("{} --plugins {}", cli.command_name, self.plugin.key);
    }

    fn bind_flags(&self, flags: &mut FlagSet) {
        for name in &self.plugin.flags {
            flags.bool(name, false, "test flag");
        }
    }

    fn read_flags(&mut self, flags: &FlagSet) -> StratumResult<()> {
        self.record(Phase::ReadFlags)?;
        for name in &self.plugin.flags {
            if flags.get_bool(name) {
                self.plugin
                    .log
                    .lock()
                    .unwrap()
                    .push(format!("{}:flag:{}", self.plugin.key, name));
            }
        }
        Ok(())
    }

    fn inject_config(&mut self, config: &dyn ProjectConfig) -> StratumResult<()> {
        self.record(Phase::InjectConfig)?;
        self.defaults = project_defaults(config);
        Ok(())
    }

    fn inject_resource(&mut self, resource: &mut Resource) -> StratumResult<()> {
        self.record(Phase::InjectResource)?;
        self.defaults.resource = Some(resource.clone());
        Ok(())
    }

    fn pre_scaffold(&mut self, fs: &dyn Filesystem) -> StratumResult<()> {
        self.record(Phase::PreScaffold)?;
        if self.plugin.write_in_pre_scaffold {
            fs.write_file(Path::new("sneaky.txt"), "x", WriteMode::Truncate)?;
        }
        Ok(())
    }

    fn scaffold(&mut self, fs: &dyn Filesystem, _config: &mut dyn ProjectConfig) -> StratumResult<()> {
        self.record(Phase::Scaffold)?;
        TemplateWriter::new(fs)
            .with_defaults(self.defaults.clone())
            .execute(self.plugin.templates.clone())?;
        let patcher = MarkerPatcher::new(fs);
        for patch in &self.plugin.patches {
            patcher.apply(patch)?;
        }
        Ok(())
    }

    fn post_scaffold(
        &mut self,
        _fs: &dyn Filesystem,
        _config: &mut dyn ProjectConfig,
    ) -> StratumResult<()> {
        self.record(Phase::PostScaffold)
    }
}

pub fn registry(plugins: Vec<TestPlugin>, bundles: Vec<Bundle>) -> Registry {
    let mut builder = Registry::builder();
    for plugin in plugins {
        builder.register_plugin(plugin).unwrap();
    }
    for bundle in bundles {
        builder.register_bundle(bundle).unwrap();
    }
    builder.build().unwrap()
}

pub fn bundle(k: &str, members: &[&str]) -> Bundle {
    Bundle::new(key(k), members.iter().map(|m| key(m))).unwrap()
}
