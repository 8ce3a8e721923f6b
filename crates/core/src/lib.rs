//! Shared data model for nudge dependency discovery.
//!
//! This crate holds the value types exchanged between the file-level
//! evaluation layer (`nudge-msbuild`) and the workspace-level orchestration
//! layer (`nudge-discovery`):
//!
//! - [`FileSet`] - the in-memory input: a workspace root plus build files as
//!   name+content pairs (file access belongs to a surrounding fetch layer)
//! - [`Dependency`] / [`DependencyKind`] - canonical dependency records
//! - [`FileDiscovery`] / [`DiscoveryResult`] - the per-file and workspace
//!   level output handed to downstream update planning
//! - [`Error`] / [`Result`] - the error surface shared by both layers
//!
//! All result lists keep file-parse/override order; nothing here sorts.

pub mod error;
pub mod files;
pub mod types;

pub use error::{Error, Result};
pub use files::{FileSet, SourceFile};
pub use types::{Dependency, DependencyKind, DiscoveryResult, FileDiscovery, Property};
