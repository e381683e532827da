//! Stratum Core - plugin resolution and scaffold execution engine.
//!
//! This crate provides the domain and application layers for the Stratum
//! scaffolding tool, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           stratum-cli (CLI)             │
//! │   (parses flags, picks an Operation)    │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  Resolver → ScaffoldService → plugins   │
//! │  (TemplateWriter, MarkerPatcher)        │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │     (Filesystem, ProjectConfig)         │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    stratum-adapters (Infrastructure)    │
//! │ (LocalFilesystem, ProjectFile, plugins) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (PluginKey, Bundle, Template, Resource) │
//! │         No I/O, no plugins              │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stratum_core::prelude::*;
//!
//! # fn demo(registry: &Registry, fs: &dyn Filesystem, config: &mut dyn ProjectConfig) {
//! let version: ProjectVersion = "3".parse().unwrap();
//! let request = ExecuteRequest::new(Operation::Init, version)
//!     .with_plugins(["standard.stratum.dev/v1"]);
//!
//! let report = ScaffoldService::new(registry).execute(request, fs, config);
//! for path in &report.written_paths {
//!     println!("wrote {}", path.display());
//! }
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ExecuteRequest, ExecutionReport, MarkerPatcher, Registry, RegistryBuilder, RegistryEntry,
        ResolvedSet, Resolver, ScaffoldService, TemplateWriter,
        plugin::{
            ApiCreator, CliMetadata, Editor, Initializer, Plugin, Subcommand, SubcommandMetadata,
            WebhookCreator,
        },
        ports::{Filesystem, ProjectConfig, WriteMode},
    };
    pub use crate::domain::{
        AnchorPatch, Bundle, Capability, ExistsPolicy, FlagSet, Operation, PluginKey,
        PluginVersion, ProjectVersion, RawFlags, Resource, Template, TemplateDefaults,
    };
    pub use crate::error::{StratumError, StratumResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
