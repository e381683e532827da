//! Writes templates to the filesystem according to their existence policy.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::application::ports::{Filesystem, ProjectConfig, WriteMode};
use crate::application::ApplicationError;
use crate::domain::{ExistsPolicy, Template, TemplateDefaults};
use crate::error::StratumResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Overwritten,
    Appended,
    Skipped,
}

impl WriteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Overwritten => "overwritten",
            Self::Appended => "appended",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub outcome: WriteOutcome,
}

/// Applies defaults, resolves paths, and writes templates one by one.
///
/// The first failing template stops the batch; earlier writes stay on disk.
pub struct TemplateWriter<'a> {
    fs: &'a dyn Filesystem,
    defaults: TemplateDefaults,
}

impl<'a> TemplateWriter<'a> {
    pub fn new(fs: &'a dyn Filesystem) -> Self {
        Self {
            fs,
            defaults: TemplateDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: TemplateDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn execute(
        &self,
        templates: impl IntoIterator<Item = Template>,
    ) -> StratumResult<Vec<WrittenFile>> {
        templates.into_iter().map(|t| self.write(t)).collect()
    }

    pub fn write(&self, mut template: Template) -> StratumResult<WrittenFile> {
        template.apply_defaults(&self.defaults);
        let relative = template.resolve_path()?;
        let path = relative.as_path();
        let exists = self.fs.exists(path);

        let (mode, outcome) = match (template.policy(), exists) {
            (_, false) => (WriteMode::CreateNew, WriteOutcome::Created),
            (ExistsPolicy::Error, true) => {
                return Err(ApplicationError::FileExists {
                    path: path.to_path_buf(),
                }
                .into());
            }
            (ExistsPolicy::Skip, true) => {
                debug!(path = %relative, "exists, skipping");
                return Ok(WrittenFile {
                    path: relative.into_path_buf(),
                    outcome: WriteOutcome::Skipped,
                });
            }
            (ExistsPolicy::Overwrite, true) => (WriteMode::Truncate, WriteOutcome::Overwritten),
            (ExistsPolicy::Append, true) => (WriteMode::Append, WriteOutcome::Appended),
        };

        if let Some(parent) = relative.parent() {
            self.fs.create_dir_all(parent.as_path())?;
        }
        self.fs.write_file(path, &template.render_body(), mode)?;

        info!(path = %relative, outcome = outcome.as_str(), "wrote template");
        Ok(WrittenFile {
            path: relative.into_path_buf(),
            outcome,
        })
    }
}

/// Template defaults taken from the project configuration.
///
/// The boilerplate header is not stored in the configuration; callers that
/// want one set it from `hack/boilerplate.txt` themselves.
pub fn project_defaults(config: &dyn ProjectConfig) -> TemplateDefaults {
    TemplateDefaults {
        boilerplate: None,
        project_name: config.project_name().map(str::to_string),
        domain: config.domain().map(str::to_string),
        resource: None,
        multigroup: config.is_multigroup(),
    }
}
