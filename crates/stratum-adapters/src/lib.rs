//! Infrastructure adapters for Stratum.
//!
//! This crate implements the ports defined in `stratum-core::application::ports`
//! and ships the built-in plugin catalog. It contains all external
//! dependencies and I/O operations.

pub mod filesystem;
pub mod plugins;
pub mod project_file;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use plugins::builtin_registry;
pub use project_file::{ProjectFile, ProjectFileError};
