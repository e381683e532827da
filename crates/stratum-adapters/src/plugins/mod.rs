//! Built-in plugin catalog.
//!
//! | Key | Capabilities |
//! |-----|--------------|
//! | `base.stratum.dev/v1` | init, create api, edit |
//! | `manifests.stratum.dev/v1` | create api, create webhook |
//! | `samples-index.stratum.dev/v1-alpha` | create api |
//! | `standard.stratum.dev/v1` | bundle of base + manifests |
//!
//! The plugins cooperate through literal scaffold markers that `base` writes
//! into the Makefile and `.gitignore` during init. Later plugins patch next
//! to those markers, so their anchors must stay byte-identical.

mod base;
mod manifests;
mod samples_index;

use std::path::Path;

use stratum_core::application::ports::Filesystem;
use stratum_core::application::Registry;
use stratum_core::domain::{Bundle, PluginKey, PluginVersion, ProjectVersion, Stage};
use stratum_core::error::StratumResult;
use tracing::debug;

pub use base::BasePlugin;
pub use manifests::ManifestsPlugin;
pub use samples_index::{SamplesIndexConfig, SamplesIndexPlugin};

/// Project version every built-in plugin targets.
pub const PROJECT_VERSION: &str = "3";

/// Bundle used by `stratum init` when no plugins are requested.
pub const DEFAULT_BUNDLE: &str = "standard.stratum.dev/v1";

pub const BOILERPLATE_PATH: &str = "hack/boilerplate.txt";

/// Makefile line after which variable blocks are inserted.
pub const MAKEFILE_VARS_MARKER: &str = "# +stratum:scaffold:makefile-vars\n";

/// `.gitignore` line after which ignore rules are inserted.
pub const GITIGNORE_MARKER: &str = "# +stratum:scaffold:gitignore\n";

// ── Public API ───────────────────────────────────────────────────────────────

/// Build the registry holding every built-in plugin and bundle.
pub fn builtin_registry() -> StratumResult<Registry> {
    let mut builder = Registry::builder();
    builder
        .register_plugin(BasePlugin::new()?)?
        .register_plugin(ManifestsPlugin::new()?)?
        .register_plugin(SamplesIndexPlugin::new()?)?
        .register_bundle(standard_bundle()?)?;
    let registry = builder.build()?;
    debug!(entries = registry.len(), "built-in registry ready");
    Ok(registry)
}

fn standard_bundle() -> StratumResult<Bundle> {
    let key = PluginKey::new("standard.stratum.dev", PluginVersion::stable(1))?;
    Ok(Bundle::new(
        key,
        vec![BasePlugin::key()?, ManifestsPlugin::key()?],
    )?)
}

// ── Shared helpers ───────────────────────────────────────────────────────────

fn plugin_key(name: &str, number: u64, stage: Stage) -> StratumResult<PluginKey> {
    Ok(PluginKey::new(name, PluginVersion::new(number, stage))?)
}

fn supported_versions() -> StratumResult<Vec<ProjectVersion>> {
    Ok(vec![ProjectVersion::new(PROJECT_VERSION)?])
}

/// The rendered boilerplate header, if the project has one.
fn read_boilerplate(fs: &dyn Filesystem) -> StratumResult<Option<String>> {
    let path = Path::new(BOILERPLATE_PATH);
    if !fs.exists(path) {
        return Ok(None);
    }
    fs.read_file(path).map(Some)
}
