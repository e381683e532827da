//! Literal-anchor text mutations.
//!
//! Pure string functions: `None` means the anchor (or block) was not found
//! and the caller must leave the file unmodified.

use crate::domain::entities::common::RelativePath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    InsertAfter { payload: String },
    Replace { replacement: String },
    Uncomment { prefix: String },
}

/// A one-shot patch description. For `Uncomment` the anchor is the
/// commented block itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorPatch {
    pub path: RelativePath,
    pub anchor: String,
    pub op: PatchOp,
}

impl AnchorPatch {
    pub fn insert_after(
        path: RelativePath,
        anchor: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            path,
            anchor: anchor.into(),
            op: PatchOp::InsertAfter {
                payload: payload.into(),
            },
        }
    }

    pub fn replace(
        path: RelativePath,
        anchor: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            path,
            anchor: anchor.into(),
            op: PatchOp::Replace {
                replacement: replacement.into(),
            },
        }
    }

    pub fn uncomment(
        path: RelativePath,
        block: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            path,
            anchor: block.into(),
            op: PatchOp::Uncomment {
                prefix: prefix.into(),
            },
        }
    }

    /// Apply to in-memory content.
    pub fn apply_to(&self, content: &str) -> Option<String> {
        match &self.op {
            PatchOp::InsertAfter { payload } => insert_after(content, &self.anchor, payload),
            PatchOp::Replace { replacement } => replace_first(content, &self.anchor, replacement),
            PatchOp::Uncomment { prefix } => uncomment(content, &self.anchor, prefix),
        }
    }
}

/// Splice `payload` right after the first occurrence of `anchor`. An empty
/// anchor matches the start of the content.
pub fn insert_after(content: &str, anchor: &str, payload: &str) -> Option<String> {
    let at = content.find(anchor)? + anchor.len();
    let mut out = String::with_capacity(content.len() + payload.len());
    out.push_str(&content[..at]);
    out.push_str(payload);
    out.push_str(&content[at..]);
    Some(out)
}

/// Substitute the first occurrence of `anchor` with `replacement`.
pub fn replace_first(content: &str, anchor: &str, replacement: &str) -> Option<String> {
    if anchor.is_empty() {
        return None;
    }
    content.find(anchor)?;
    Some(content.replacen(anchor, replacement, 1))
}

/// Strip `prefix` from the start of every line of `block`, where `block`
/// must occur verbatim in `content`. Lines without the prefix are kept.
pub fn uncomment(content: &str, block: &str, prefix: &str) -> Option<String> {
    if block.is_empty() {
        return None;
    }
    let start = content.find(block)?;
    let stripped = block
        .split_inclusive('\n')
        .map(|line| line.strip_prefix(prefix).unwrap_or(line))
        .collect::<String>();

    let mut out = String::with_capacity(content.len());
    out.push_str(&content[..start]);
    out.push_str(&stripped);
    out.push_str(&content[start + block.len()..]);
    Some(out)
}
