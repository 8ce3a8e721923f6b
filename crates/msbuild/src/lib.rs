//! MSBuild-style build-file evaluation for nudge.
//!
//! This crate covers everything that happens at the level of a single
//! project and its surrounding shared files, before workspace-wide
//! aggregation:
//!
//! - [`expr`] - `$(Property)` expansion and boolean condition evaluation
//! - [`properties`] - ordered property accumulation with override rules
//! - [`document`] - parsing one XML build file into groups, items and imports
//! - [`imports`] - resolving the ancestor build-file chain for a project
//! - [`frameworks`] - splitting target-framework properties, fail-closed on
//!   unresolved monikers
//!
//! # Example
//!
//! ```
//! use nudge_msbuild::document::ProjectDocument;
//! use nudge_msbuild::properties::PropertyModel;
//! use std::path::Path;
//!
//! let doc = ProjectDocument::parse(
//!     Path::new("app.csproj"),
//!     r#"<Project Sdk="Microsoft.NET.Sdk">
//!          <PropertyGroup><TargetFramework>net8.0</TargetFramework></PropertyGroup>
//!        </Project>"#,
//! )?;
//!
//! let mut model = PropertyModel::new();
//! for group in &doc.property_groups {
//!     for (name, value) in &group.properties {
//!         model.set(name, value, group.condition.as_deref(), &doc.path)?;
//!     }
//! }
//! assert_eq!(model.value_of("TargetFramework"), Some("net8.0"));
//! # Ok::<(), nudge_core::Error>(())
//! ```

pub mod document;
pub mod expr;
pub mod frameworks;
pub mod imports;
pub mod properties;

pub use document::{DependencyItem, ItemGroup, ItemKind, ProjectDocument, PropertyGroup, SdkImport};
pub use expr::{Expansion, FrameworkScope, PropertyScope, evaluate_condition, expand};
pub use frameworks::resolve_frameworks;
pub use imports::{find_central_file, import_chain};
pub use properties::PropertyModel;
