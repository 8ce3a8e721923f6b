//! The discovery orchestrator.
//!
//! One [`DiscoveryWorker`] run takes a [`FileSet`] and produces a
//! [`DiscoveryResult`]. Per-project evaluation shares no mutable state, so
//! projects run in parallel; the central-file analysis is computed once and
//! read-only thereafter, and metadata lookups go through one memoized
//! cache. The worker always returns partial results: a project that fails
//! to parse or resolve its frameworks is logged and dropped without
//! affecting its siblings.

use crate::aggregate::DependencyAggregator;
use crate::central::{self, CentralState};
use crate::evaluate;
use crate::metadata::{MetadataCache, PackageMetadataProvider};
use nudge_core::{Dependency, DependencyKind, DiscoveryResult, FileDiscovery, FileSet, SourceFile};
use nudge_msbuild::document::ProjectDocument;
use nudge_msbuild::properties::PropertyModel;
use nudge_msbuild::{frameworks, imports};
use rayon::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// Per-project evaluation phase. `Dropped` and `Finalized` are terminal;
/// a dropped project contributes nothing to the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Parsed,
    PropertiesResolving,
    FrameworksResolving,
    DependenciesAggregating,
    Dropped,
    Finalized,
}

fn advance(project: &Path, from: Phase, to: Phase) -> Phase {
    tracing::trace!(project = %project.display(), ?from, ?to, "Project phase transition");
    to
}

/// Discovers dependencies across one workspace.
pub struct DiscoveryWorker<'a> {
    provider: &'a dyn PackageMetadataProvider,
}

impl<'a> DiscoveryWorker<'a> {
    /// Creates a worker backed by the given metadata collaborator.
    pub fn new(provider: &'a dyn PackageMetadataProvider) -> Self {
        Self { provider }
    }

    /// Runs discovery over the file set.
    ///
    /// The result lists project files first, then contributing shared build
    /// files, each in file-set order; the central-package file (if any)
    /// comes back as its own top-level entry. Re-running on an unchanged
    /// file set yields an identical result.
    #[must_use]
    pub fn discover(&self, files: &FileSet) -> DiscoveryResult {
        tracing::debug!(
            workspace = %files.root.display(),
            file_count = files.files.len(),
            "Starting dependency discovery"
        );

        let analysis = central::analyze(files);
        let cache = MetadataCache::new(self.provider);

        let project_files: Vec<&SourceFile> = files.project_files().collect();
        let mut projects: Vec<FileDiscovery> = project_files
            .par_iter()
            .map(|project| discover_project(files, project, &analysis.state, &cache))
            .collect::<Vec<Option<FileDiscovery>>>()
            .into_iter()
            .flatten()
            .collect();

        // Shared build files report as their own entries too, with their
        // declarations marked direct.
        for file in files.files.iter().filter(|f| central::is_shared_build_file(f)) {
            if let Some(entry) = discover_shared(file, &analysis.state) {
                projects.push(entry);
            }
        }

        tracing::debug!(
            project_count = projects.len(),
            central = analysis.file.is_some(),
            "Discovery finished"
        );
        DiscoveryResult {
            workspace_path: files.root.clone(),
            projects,
            central_file: analysis.file,
        }
    }
}

/// Evaluates one project through its import chain. Returns `None` when the
/// project fails (parse error or fail-closed framework resolution); sibling
/// projects are unaffected.
fn discover_project(
    files: &FileSet,
    project: &SourceFile,
    central: &CentralState,
    cache: &MetadataCache<'_>,
) -> Option<FileDiscovery> {
    let chain = imports::import_chain(files, project);
    let mut docs = Vec::with_capacity(chain.len());
    for file in &chain {
        match ProjectDocument::parse(&file.path, &file.contents) {
            Ok(doc) => docs.push(doc),
            Err(error) => {
                tracing::warn!(
                    project = %project.path.display(),
                    file = %file.path.display(),
                    error = %error,
                    "Parse failure - project skipped"
                );
                return None;
            }
        }
    }
    let mut phase = advance(&project.path, Phase::Parsed, Phase::PropertiesResolving);

    // Property accumulation in application order; the central file's
    // property groups participate just before the project's own content.
    let mut model = PropertyModel::new();
    for doc in &docs {
        if doc.path == project.path {
            for group in &central.property_groups {
                for (name, raw) in &group.properties {
                    let file = central.file_path().unwrap_or(&doc.path);
                    if let Err(error) = model.set(name, raw, group.condition.as_deref(), file) {
                        tracing::warn!(
                            project = %project.path.display(),
                            error = %error,
                            "Central property evaluation failed - project skipped"
                        );
                        return None;
                    }
                }
            }
        }
        if let Err(error) = evaluate::apply_property_groups(doc, &mut model) {
            tracing::warn!(
                project = %project.path.display(),
                file = %doc.path.display(),
                error = %error,
                "Property evaluation failed - project skipped"
            );
            return None;
        }
    }
    phase = advance(&project.path, phase, Phase::FrameworksResolving);

    let target_frameworks = match frameworks::resolve_frameworks(&model, &project.path) {
        Ok(frameworks) => frameworks,
        Err(error) => {
            tracing::warn!(
                project = %project.path.display(),
                error = %error,
                "Target frameworks unresolvable - project dropped"
            );
            advance(&project.path, phase, Phase::Dropped);
            return None;
        }
    };
    phase = advance(&project.path, phase, Phase::DependenciesAggregating);

    let mut agg = DependencyAggregator::new();
    for doc in &docs {
        let is_own = doc.path == project.path;
        evaluate::merge_sdk_records(doc, &mut agg);
        if let Err(error) =
            evaluate::merge_items(doc, &model, &target_frameworks, central, is_own, &mut agg)
        {
            tracing::warn!(
                project = %project.path.display(),
                file = %doc.path.display(),
                error = %error,
                "Item evaluation failed - project skipped"
            );
            return None;
        }
    }

    // Centrally declared global references apply to every project without a
    // per-project declaration.
    if central.enabled() {
        let declared_in = central
            .file_path()
            .map_or_else(|| project.path.clone(), Path::to_path_buf);
        for (name, version) in central.global_references() {
            let mut dep = Dependency::new(
                name.clone(),
                Some(version.clone()),
                DependencyKind::GlobalPackageReference,
                declared_in.clone(),
            );
            dep.is_direct = true;
            dep.target_frameworks = target_frameworks.clone();
            agg.merge(dep);
        }
    }

    expand_transitive(&mut agg, cache, &project.path);
    advance(&project.path, phase, Phase::Finalized);

    let own_doc = docs.iter().find(|doc| doc.path == project.path)?;
    Some(FileDiscovery {
        file_path: project.path.clone(),
        dependencies: agg.into_records(),
        properties: model.report(),
        target_frameworks,
        referenced_project_paths: own_doc.referenced_projects.iter().map(PathBuf::from).collect(),
    })
}

/// Walks the transitive closure of every versioned package record through
/// the metadata collaborator.
///
/// Children are typed Unknown and restricted to the intersection of the
/// parent's frameworks and the frameworks the child actually ships; a
/// failed or missing lookup leaves the parent recorded without children.
fn expand_transitive(agg: &mut DependencyAggregator, cache: &MetadataCache<'_>, declared_in: &Path) {
    let mut queue: VecDeque<(String, String, Vec<String>)> = agg
        .records()
        .iter()
        .filter(|record| {
            matches!(
                record.kind,
                DependencyKind::PackageReference | DependencyKind::GlobalPackageReference
            ) && !record.is_unresolved
        })
        .filter_map(|record| {
            record
                .version
                .as_ref()
                .filter(|version| !version.is_empty())
                .map(|version| {
                    (
                        record.name.clone(),
                        version.clone(),
                        record.target_frameworks.clone(),
                    )
                })
        })
        .collect();

    let mut visited: HashSet<(String, String)> = HashSet::new();
    while let Some((name, version, parent_frameworks)) = queue.pop_front() {
        if !visited.insert((name.to_ascii_lowercase(), version.clone())) {
            continue;
        }
        let Some(metadata) = cache.get(&name, &version) else {
            continue;
        };

        for group in &metadata.groups {
            // A framework-scoped group only applies where the parent
            // actually targets that framework.
            let base: Vec<String> = match &group.target_framework {
                Some(scoped) => {
                    let matching: Vec<String> = parent_frameworks
                        .iter()
                        .filter(|f| f.eq_ignore_ascii_case(scoped))
                        .cloned()
                        .collect();
                    if matching.is_empty() {
                        continue;
                    }
                    matching
                }
                None => parent_frameworks.clone(),
            };

            for requirement in &group.requirements {
                match agg.kind_of(&requirement.name) {
                    None | Some(DependencyKind::Unknown) => {}
                    // Already declared directly; the declared record is
                    // authoritative.
                    Some(_) => continue,
                }

                let child_frameworks: Vec<String> =
                    match cache.get(&requirement.name, &requirement.version) {
                        Some(child) if !child.shipped_frameworks.is_empty() => base
                            .iter()
                            .filter(|f| {
                                child
                                    .shipped_frameworks
                                    .iter()
                                    .any(|shipped| shipped.eq_ignore_ascii_case(f))
                            })
                            .cloned()
                            .collect(),
                        _ => base.clone(),
                    };
                if child_frameworks.is_empty() && !base.is_empty() {
                    // Ships nothing the parent targets.
                    continue;
                }

                let mut dep = Dependency::new(
                    requirement.name.clone(),
                    Some(requirement.version.clone()),
                    DependencyKind::Unknown,
                    declared_in,
                );
                dep.is_transitive = true;
                dep.target_frameworks = child_frameworks.clone();
                agg.merge(dep);
                queue.push_back((
                    requirement.name.clone(),
                    requirement.version.clone(),
                    child_frameworks,
                ));
            }
        }
    }
}

/// Evaluates a shared build file as its own result entry. Its declarations
/// are direct; global references and transitive expansion apply to
/// projects only.
fn discover_shared(file: &SourceFile, central: &CentralState) -> Option<FileDiscovery> {
    let doc = match ProjectDocument::parse(&file.path, &file.contents) {
        Ok(doc) => doc,
        Err(error) => {
            tracing::warn!(file = %file.path.display(), error = %error, "Parse failure - shared file skipped");
            return None;
        }
    };

    let mut model = PropertyModel::new();
    if let Err(error) = evaluate::apply_property_groups(&doc, &mut model) {
        tracing::warn!(file = %file.path.display(), error = %error, "Property evaluation failed - shared file skipped");
        return None;
    }

    let target_frameworks = match frameworks::resolve_frameworks(&model, &file.path) {
        Ok(frameworks) => frameworks,
        Err(error) => {
            tracing::warn!(file = %file.path.display(), error = %error, "Target frameworks unresolvable - shared file dropped");
            return None;
        }
    };

    let mut agg = DependencyAggregator::new();
    evaluate::merge_sdk_records(&doc, &mut agg);
    if let Err(error) =
        evaluate::merge_items(&doc, &model, &target_frameworks, central, true, &mut agg)
    {
        tracing::warn!(file = %file.path.display(), error = %error, "Item evaluation failed - shared file skipped");
        return None;
    }

    Some(FileDiscovery {
        file_path: file.path.clone(),
        dependencies: agg.into_records(),
        properties: model.report(),
        target_frameworks,
        referenced_project_paths: doc.referenced_projects.iter().map(PathBuf::from).collect(),
    })
}
