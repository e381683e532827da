//! Literal-anchor edits to files that already exist.
//!
//! Every operation reads the whole file, edits it in memory, and writes it
//! back only on success, so a missing anchor never leaves a partial edit.

use std::path::Path;

use tracing::{debug, info};

use crate::application::ports::{Filesystem, WriteMode};
use crate::application::ApplicationError;
use crate::domain::{AnchorPatch, PatchOp, RelativePath};
use crate::error::StratumResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    AlreadyApplied,
}

pub struct MarkerPatcher<'a> {
    fs: &'a dyn Filesystem,
}

impl<'a> MarkerPatcher<'a> {
    pub fn new(fs: &'a dyn Filesystem) -> Self {
        Self { fs }
    }

    /// Insert `payload` right after the first occurrence of `anchor`.
    ///
    /// Not idempotent: running it again while the anchor is still present
    /// inserts the payload a second time. Use [`Self::ensure_after`] for
    /// repeatable edits.
    pub fn insert_after(&self, file: &Path, anchor: &str, payload: &str) -> StratumResult<()> {
        self.apply(&AnchorPatch::insert_after(
            RelativePath::try_new(file)?,
            anchor,
            payload,
        ))
    }

    /// Replace the first occurrence of `anchor`.
    pub fn replace(&self, file: &Path, anchor: &str, replacement: &str) -> StratumResult<()> {
        self.apply(&AnchorPatch::replace(
            RelativePath::try_new(file)?,
            anchor,
            replacement,
        ))
    }

    /// Strip `prefix` from each line of `block`, which must appear verbatim.
    pub fn uncomment(&self, file: &Path, block: &str, prefix: &str) -> StratumResult<()> {
        self.apply(&AnchorPatch::uncomment(
            RelativePath::try_new(file)?,
            block,
            prefix,
        ))
    }

    pub fn has_fragment(&self, file: &Path, fragment: &str) -> StratumResult<bool> {
        Ok(self.fs.read_file(file)?.contains(fragment))
    }

    /// Insert after `anchor` unless `marker` is already in the file.
    pub fn ensure_after(
        &self,
        file: &Path,
        anchor: &str,
        payload: &str,
        marker: &str,
    ) -> StratumResult<PatchOutcome> {
        if self.has_fragment(file, marker)? {
            debug!(path = %file.display(), marker, "already applied");
            return Ok(PatchOutcome::AlreadyApplied);
        }
        self.insert_after(file, anchor, payload)?;
        Ok(PatchOutcome::Applied)
    }

    pub fn apply(&self, patch: &AnchorPatch) -> StratumResult<()> {
        let path = patch.path.as_path();
        let content = self.fs.read_file(path)?;

        let patched = patch
            .apply_to(&content)
            .ok_or_else(|| ApplicationError::AnchorNotFound {
                path: path.to_path_buf(),
                anchor: patch.anchor.clone(),
            })?;

        self.fs.write_file(path, &patched, WriteMode::Truncate)?;
        info!(path = %patch.path, op = op_name(&patch.op), "patched");
        Ok(())
    }
}

fn op_name(op: &PatchOp) -> &'static str {
    match op {
        PatchOp::InsertAfter { .. } => "insert-after",
        PatchOp::Replace { .. } => "replace",
        PatchOp::Uncomment { .. } => "uncomment",
    }
}
