//! Canonical dependency records and the discovery report.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The kind of declaration a dependency record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    /// A `<PackageReference>` item.
    PackageReference,
    /// A `<PackageVersion>` item (central package management pool).
    PackageVersion,
    /// A `<GlobalPackageReference>` item, applied workspace-wide.
    GlobalPackageReference,
    /// A synthetic record for the SDK a file opts into.
    MsBuildSdk,
    /// A package known only through transitive expansion.
    Unknown,
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PackageReference => write!(f, "PackageReference"),
            Self::PackageVersion => write!(f, "PackageVersion"),
            Self::GlobalPackageReference => write!(f, "GlobalPackageReference"),
            Self::MsBuildSdk => write!(f, "MSBuildSdk"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One canonical dependency record.
///
/// Identity within a file result is `(name, kind)`; the same package seen
/// under several target-framework contexts unions into a single record's
/// framework set rather than duplicating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package (or SDK) name.
    pub name: String,
    /// Declared version. `None` only for synthetic SDK records; an empty
    /// string means "declared without a version"; the value may remain an
    /// unresolved `$(...)` expression when resolution genuinely failed.
    pub version: Option<String>,
    /// What kind of declaration produced this record.
    pub kind: DependencyKind,
    /// Declared in the project's own file (as opposed to inherited from a
    /// shared build-props/targets file).
    pub is_direct: bool,
    /// Pulled in indirectly via a direct dependency's declared dependencies.
    pub is_transitive: bool,
    /// Declared with `Update=` rather than `Include=`.
    pub is_update: bool,
    /// The version still contains an unresolved property reference; the
    /// record is kept with the raw expression but cannot be acted on.
    pub is_unresolved: bool,
    /// Target frameworks under which this dependency applies, in resolution
    /// order. Always a subset of the owning project's resolved frameworks.
    pub target_frameworks: Vec<String>,
    /// The file whose declaration produced (or last overrode) this record.
    pub declared_in: PathBuf,
}

impl Dependency {
    /// Creates a plain record with no flags set.
    pub fn new(
        name: impl Into<String>,
        version: Option<String>,
        kind: DependencyKind,
        declared_in: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            kind,
            is_direct: false,
            is_transitive: false,
            is_update: false,
            is_unresolved: false,
            target_frameworks: Vec::new(),
            declared_in: declared_in.into(),
        }
    }
}

/// One evaluated property, as reported in a file result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property name.
    pub name: String,
    /// The raw assignment text as written in the file.
    pub raw: String,
    /// The resolved value. Equal to `raw` when there was nothing to expand;
    /// still contains `$(...)` only when resolution genuinely failed.
    pub resolved: String,
    /// Condition attached to the winning assignment, if any.
    pub condition: Option<String>,
    /// File containing the winning assignment.
    pub defined_in: PathBuf,
    /// Sequence number of the winning assignment within the evaluation.
    /// Later-applied assignments carry higher numbers.
    pub order: usize,
}

/// Everything discovered for one build file (a project, or a shared file
/// reported as its own entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiscovery {
    /// Workspace-relative path of the file.
    pub file_path: PathBuf,
    /// Dependency records in parse/override order.
    pub dependencies: Vec<Dependency>,
    /// Winning property assignments in first-assignment order.
    pub properties: Vec<Property>,
    /// The file's resolved target framework monikers, in declaration order.
    pub target_frameworks: Vec<String>,
    /// Paths referenced through `<ProjectReference>` items.
    pub referenced_project_paths: Vec<PathBuf>,
}

/// The workspace-level discovery report.
///
/// List ordering is significant for equality testing: it follows
/// file-parse/override order, never a sort. Projects that failed fail-closed
/// target-framework resolution are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    /// The workspace root this run covered.
    pub workspace_path: PathBuf,
    /// Per-file results: project files first, then contributing shared build
    /// files, each in file-set order.
    pub projects: Vec<FileDiscovery>,
    /// The shared central-package file (`Directory.Packages.props` /
    /// `Packages.props`), evaluated once for the whole workspace.
    pub central_file: Option<FileDiscovery>,
}
