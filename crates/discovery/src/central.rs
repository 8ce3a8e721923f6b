//! Central package management.
//!
//! When a workspace declares versions centrally - `Directory.Packages.props`
//! (or the legacy `Packages.props`) plus `ManagePackageVersionsCentrally`,
//! or a targets file importing a central-package-versions-capable SDK - the
//! shared file is parsed once for the whole workspace. Its `PackageVersion`
//! pool fills in versions for versionless project references, and its
//! `GlobalPackageReference` entries apply to every project implicitly.
//!
//! The analysis result is read-only: every project evaluation shares one
//! [`CentralState`].

use crate::aggregate::DependencyAggregator;
use crate::evaluate;
use nudge_core::{FileDiscovery, FileSet, SourceFile};
use nudge_msbuild::document::{ItemKind, ProjectDocument};
use nudge_msbuild::properties::PropertyModel;
use nudge_msbuild::{expr, frameworks, imports};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Workspace-wide central package management state, computed once per run.
#[derive(Debug, Default)]
pub struct CentralState {
    enabled: bool,
    file_path: Option<PathBuf>,
    /// Property groups of the central file; they participate in every
    /// project's property model.
    pub(crate) property_groups: Vec<nudge_msbuild::document::PropertyGroup>,
    /// Lowercased name -> version from the `PackageVersion` pool.
    versions: HashMap<String, String>,
    /// `GlobalPackageReference` entries in declaration order.
    globals: Vec<(String, String)>,
}

impl CentralState {
    /// State for a workspace without central package management.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether central package management is active for this workspace.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Path of the central file, when one exists.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Centrally declared version for `name`, by exact (case-insensitive)
    /// name match against the `PackageVersion` pool.
    #[must_use]
    pub fn version_for(&self, name: &str) -> Option<&str> {
        self.versions
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Version for an `Update=` directive: the `GlobalPackageReference`
    /// pool first, then the `PackageVersion` pool.
    #[must_use]
    pub fn update_version_for(&self, name: &str) -> Option<&str> {
        self.globals
            .iter()
            .find(|(global, _)| global.eq_ignore_ascii_case(name))
            .map(|(_, version)| version.as_str())
            .or_else(|| self.version_for(name))
    }

    /// The `GlobalPackageReference` entries, in declaration order.
    #[must_use]
    pub fn global_references(&self) -> &[(String, String)] {
        &self.globals
    }
}

/// The outcome of central-file analysis: the shared state plus the central
/// file's own top-level result.
#[derive(Debug, Default)]
pub struct CentralAnalysis {
    /// Read-only state shared by every project evaluation.
    pub state: CentralState,
    /// The central file evaluated as its own result, when present and
    /// parseable.
    pub file: Option<FileDiscovery>,
}

/// Whether this is a shared ancestor build file (`Directory.Build.props` /
/// `Directory.Build.targets`).
pub(crate) fn is_shared_build_file(file: &SourceFile) -> bool {
    file.path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| {
            name.eq_ignore_ascii_case("Directory.Build.props")
                || name.eq_ignore_ascii_case("Directory.Build.targets")
        })
}

/// True when the value of `ManagePackageVersionsCentrally` opts in.
fn opts_in(model: &PropertyModel) -> bool {
    model
        .value_of("ManagePackageVersionsCentrally")
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

/// Whether any targets file imports a central-package-versions-capable SDK.
fn targets_sdk_activates(files: &FileSet) -> bool {
    files
        .files
        .iter()
        .filter(|file| {
            file.path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("targets"))
        })
        .any(|file| match ProjectDocument::parse(&file.path, &file.contents) {
            Ok(doc) => doc.sdk_imports.iter().any(|import| {
                import
                    .name
                    .to_ascii_lowercase()
                    .contains("centralpackageversions")
            }),
            Err(error) => {
                tracing::debug!(file = %file.path.display(), error = %error, "Skipping unparseable targets file");
                false
            }
        })
}

/// Whether any shared build file sets `ManagePackageVersionsCentrally=true`.
fn shared_files_opt_in(files: &FileSet) -> bool {
    files
        .files
        .iter()
        .filter(|file| is_shared_build_file(file))
        .any(|file| {
            let Ok(doc) = ProjectDocument::parse(&file.path, &file.contents) else {
                return false;
            };
            let mut model = PropertyModel::new();
            if evaluate::apply_property_groups(&doc, &mut model).is_err() {
                return false;
            }
            opts_in(&model)
        })
}

/// Analyzes the workspace's central package management, once per run.
///
/// Never fails: an unparseable central file is logged and treated as
/// absent, so sibling projects still evaluate.
#[must_use]
pub fn analyze(files: &FileSet) -> CentralAnalysis {
    let externally_enabled = targets_sdk_activates(files) || shared_files_opt_in(files);

    let Some(source) = imports::find_central_file(files) else {
        return CentralAnalysis {
            state: CentralState {
                enabled: externally_enabled,
                ..CentralState::default()
            },
            file: None,
        };
    };
    tracing::debug!(file = %source.path.display(), "Found central package file");

    let evaluated = ProjectDocument::parse(&source.path, &source.contents).and_then(|doc| {
        let mut model = PropertyModel::new();
        evaluate::apply_property_groups(&doc, &mut model)?;
        Ok((doc, model))
    });
    let (doc, model) = match evaluated {
        Ok(parsed) => parsed,
        Err(error) => {
            tracing::warn!(
                file = %source.path.display(),
                error = %error,
                "Central package file could not be evaluated - central management unavailable"
            );
            return CentralAnalysis {
                state: CentralState {
                    enabled: externally_enabled,
                    ..CentralState::default()
                },
                file: None,
            };
        }
    };

    // Pool pass: collect PackageVersion and GlobalPackageReference entries
    // from condition-satisfied groups before record evaluation, so Update
    // directives can draw on pools declared anywhere in the file.
    let mut versions = HashMap::new();
    let mut globals: Vec<(String, String)> = Vec::new();
    for group in &doc.item_groups {
        let satisfied = group
            .condition
            .as_deref()
            .map_or(Ok(true), |cond| expr::evaluate_condition(cond, &model));
        match satisfied {
            Ok(true) => {}
            Ok(false) => continue,
            Err(error) => {
                tracing::warn!(
                    file = %source.path.display(),
                    error = %error,
                    "Skipping central item group with malformed condition"
                );
                continue;
            }
        }
        for item in &group.items {
            let item_satisfied = item
                .condition
                .as_deref()
                .map_or(Ok(true), |cond| expr::evaluate_condition(cond, &model));
            match item_satisfied {
                Ok(true) => {}
                Ok(false) => continue,
                Err(error) => {
                    tracing::warn!(
                        file = %source.path.display(),
                        error = %error,
                        "Skipping central item with malformed condition"
                    );
                    continue;
                }
            }
            let Some(include) = &item.include else {
                // A wildcard update rewrites the pooled global versions;
                // per-project implicit records read the same pool.
                if let (Some(update), Some(raw)) = (&item.update, item.raw_version()) {
                    if item.kind == ItemKind::PackageReference
                        && update.trim().eq_ignore_ascii_case(evaluate::GLOBAL_WILDCARD)
                    {
                        let version = expr::expand(raw, &model).value;
                        for (_, pooled) in &mut globals {
                            pooled.clone_from(&version);
                        }
                    }
                }
                continue;
            };
            let name = expr::expand(include, &model).value;
            let version = item
                .raw_version()
                .map(|raw| expr::expand(raw, &model).value)
                .unwrap_or_default();
            match item.kind {
                ItemKind::PackageVersion => {
                    versions.insert(name.to_ascii_lowercase(), version);
                }
                ItemKind::GlobalPackageReference => globals.push((name, version)),
                ItemKind::PackageReference => {}
            }
        }
    }

    let state = CentralState {
        enabled: opts_in(&model) || externally_enabled,
        file_path: Some(source.path.clone()),
        property_groups: doc.property_groups.clone(),
        versions,
        globals,
    };

    // The central file's own top-level result.
    let target_frameworks = frameworks::resolve_frameworks(&model, &doc.path).unwrap_or_else(|error| {
        tracing::warn!(file = %doc.path.display(), error = %error, "Central file frameworks unresolved");
        Vec::new()
    });
    let mut agg = DependencyAggregator::new();
    evaluate::merge_sdk_records(&doc, &mut agg);
    let file = match evaluate::merge_items(&doc, &model, &target_frameworks, &state, true, &mut agg)
    {
        Ok(()) => Some(FileDiscovery {
            file_path: doc.path.clone(),
            dependencies: agg.into_records(),
            properties: model.report(),
            target_frameworks,
            referenced_project_paths: doc
                .referenced_projects
                .iter()
                .map(PathBuf::from)
                .collect(),
        }),
        Err(error) => {
            tracing::warn!(
                file = %doc.path.display(),
                error = %error,
                "Central file item evaluation failed"
            );
            None
        }
    };

    CentralAnalysis { state, file }
}
