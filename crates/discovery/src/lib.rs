//! Workspace-level dependency discovery for MSBuild-style build files.
//!
//! Feed a [`FileSet`] (workspace root plus build files as name+content
//! pairs) to a [`DiscoveryWorker`] and get back a
//! [`DiscoveryResult`](nudge_core::DiscoveryResult): canonical per-project
//! dependency records with direct/transitive, update-style and
//! per-target-framework applicability, ready for downstream update
//! planning.
//!
//! ```
//! use nudge_core::FileSet;
//! use nudge_discovery::{DiscoveryWorker, NullMetadataProvider};
//!
//! let files = FileSet::new(
//!     "",
//!     [(
//!         "app.csproj",
//!         r#"<Project Sdk="Microsoft.NET.Sdk">
//!              <PropertyGroup><TargetFramework>net8.0</TargetFramework></PropertyGroup>
//!              <ItemGroup><PackageReference Include="Serde.Net" Version="1.0.0" /></ItemGroup>
//!            </Project>"#,
//!     )],
//! );
//!
//! let provider = NullMetadataProvider;
//! let result = DiscoveryWorker::new(&provider).discover(&files);
//! assert_eq!(result.projects.len(), 1);
//! ```
//!
//! Transitive expansion needs a real [`PackageMetadataProvider`]; the
//! worker memoizes its lookups per run and degrades failed lookups to
//! "recorded without transitive children".

pub mod aggregate;
pub mod central;
mod evaluate;
pub mod metadata;
pub mod worker;

pub use aggregate::DependencyAggregator;
pub use central::{CentralAnalysis, CentralState};
pub use metadata::{
    DependencyGroup, MetadataCache, NullMetadataProvider, PackageMetadata,
    PackageMetadataProvider, PackageRequirement,
};
pub use nudge_core::FileSet;
pub use worker::DiscoveryWorker;
