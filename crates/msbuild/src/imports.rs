//! Ancestor build-file resolution.
//!
//! Given a project path, discovery walks from the workspace root down to the
//! project's own directory collecting the shared files that apply to it, in
//! root-to-leaf application order:
//!
//! 1. every `Directory.Build.props` on the way (applies before the project's
//!    own content),
//! 2. the project file itself,
//! 3. every `Directory.Build.targets` on the way (applies after).
//!
//! `Directory.Packages.props` / `Packages.props` is not part of any single
//! project's chain - it is shared by the whole workspace and parsed as a
//! separate top-level result.

use nudge_core::{FileSet, SourceFile};
use std::path::{Path, PathBuf};

/// Directories from the workspace root down to (and including) the
/// project's own directory.
fn ancestor_dirs(project: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::new()];
    let mut current = PathBuf::new();
    if let Some(parent) = project.parent() {
        for component in parent.components() {
            current.push(component);
            dirs.push(current.clone());
        }
    }
    dirs
}

/// Resolves the ordered build-file chain for one project.
///
/// Only files actually present in the file set appear; the project file
/// itself is always included (the caller guarantees it exists).
#[must_use]
pub fn import_chain<'a>(files: &'a FileSet, project: &'a SourceFile) -> Vec<&'a SourceFile> {
    let dirs = ancestor_dirs(&project.path);
    let mut chain = Vec::new();

    for dir in &dirs {
        if let Some(props) = files.find_named(dir, "Directory.Build.props") {
            chain.push(props);
        }
    }
    chain.push(project);
    for dir in &dirs {
        if let Some(targets) = files.find_named(dir, "Directory.Build.targets") {
            chain.push(targets);
        }
    }
    chain
}

/// Finds the central-package file shared by the workspace: the first
/// `Directory.Packages.props` in file-set order, falling back to the legacy
/// `Packages.props` name.
#[must_use]
pub fn find_central_file(files: &FileSet) -> Option<&SourceFile> {
    let named = |name: &str| {
        files.files.iter().find(|file| {
            file.path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
    };
    named("Directory.Packages.props").or_else(|| named("Packages.props"))
}
