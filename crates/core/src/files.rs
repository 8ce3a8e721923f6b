//! In-memory build-file input.
//!
//! Discovery never touches the filesystem: a surrounding fetch layer hands
//! over the workspace root and the relevant build files as name+content
//! pairs, and [`FileSet`] is that hand-over. File order is preserved and
//! meaningful - the discovery result lists projects in file-set order.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extensions recognized as MSBuild project files.
const PROJECT_EXTENSIONS: &[&str] = &["csproj", "vbproj", "fsproj", "proj"];

/// One build file: a workspace-relative path and its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the workspace root.
    pub path: PathBuf,
    /// Full file content.
    pub contents: String,
}

/// A workspace root plus its relevant build files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSet {
    /// The workspace root path (may be empty for repository-root workspaces).
    pub root: PathBuf,
    /// All build files, in the order the fetch layer supplied them.
    pub files: Vec<SourceFile>,
}

impl FileSet {
    /// Creates a file set from `(path, contents)` pairs.
    pub fn new(
        root: impl Into<PathBuf>,
        files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<String>)>,
    ) -> Self {
        Self {
            root: root.into(),
            files: files
                .into_iter()
                .map(|(path, contents)| SourceFile {
                    path: path.into(),
                    contents: contents.into(),
                })
                .collect(),
        }
    }

    /// Looks up a file's content by exact path.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&str> {
        self.files
            .iter()
            .find(|file| file.path == path)
            .map(|file| file.contents.as_str())
    }

    /// Looks up a file by directory + file name, comparing the file name
    /// case-insensitively (build files come from case-insensitive
    /// filesystems).
    #[must_use]
    pub fn find_named(&self, dir: &Path, name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|file| {
            file.path.parent().unwrap_or(Path::new("")) == dir
                && file
                    .path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
    }

    /// All project files (`.csproj`, `.vbproj`, `.fsproj`, `.proj`), in
    /// file-set order.
    pub fn project_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(|file| {
            file.path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    PROJECT_EXTENSIONS
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                })
        })
    }
}
