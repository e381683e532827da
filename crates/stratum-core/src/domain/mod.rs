// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Stratum.
//!
//! Pure rules for plugin identity, bundles, resources, templates, anchor
//! patches and flags. All I/O and plugin behaviour is reached through the
//! ports and traits of the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Immutable values**: All domain objects are Clone + PartialEq
pub mod entities;
pub mod error;
pub mod value_objects;

pub use entities::{
    bundle::Bundle,
    common::RelativePath,
    flags::{FlagSet, FlagSpec, FlagValue, RawFlags},
    patch::{AnchorPatch, PatchOp},
    plugin_key::{PluginKey, PluginRequest},
    resource::{Resource, Webhooks},
    template::{RenderContext, Template, TemplateDefaults},
};

pub use error::{DomainError, ErrorCategory};

pub use value_objects::{
    Capability, Cardinality, ExistsPolicy, Operation, Phase, PluginVersion, ProjectVersion, Stage,
};
