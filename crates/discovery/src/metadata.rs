//! The package metadata collaborator.
//!
//! Discovery does not restore or resolve packages itself; an external
//! provider answers "given name+version, what does this package declare as
//! dependencies, and which framework-specific binary folders does it ship?".
//! The provider is the only latency-bearing call in a run, so lookups are
//! memoized by name+version for the lifetime of one run.

use nudge_core::Result;
use std::collections::HashMap;
use std::sync::Mutex;

/// One declared dependency requirement inside a dependency group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequirement {
    /// Required package name.
    pub name: String,
    /// Required version as declared.
    pub version: String,
}

/// A package's declared dependency group, optionally scoped to one
/// target framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGroup {
    /// The framework this group applies to, or `None` for all frameworks.
    pub target_framework: Option<String>,
    /// Requirements declared in the group.
    pub requirements: Vec<PackageRequirement>,
}

/// What the metadata provider knows about one published package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Declared dependency groups.
    pub groups: Vec<DependencyGroup>,
    /// Target frameworks for which the package ships a binary folder
    /// (e.g. `lib/net8.0/`). Transitive records are restricted to these.
    pub shipped_frameworks: Vec<String>,
}

/// External package metadata lookup.
///
/// Implementations are expected to be remote-backed; a failed lookup is
/// non-fatal and only degrades the affected dependency to "recorded without
/// transitive children".
pub trait PackageMetadataProvider: Send + Sync {
    /// Looks up metadata for `name` at `version`. `Ok(None)` means the
    /// package is unknown to the provider.
    ///
    /// # Errors
    ///
    /// Returns [`nudge_core::Error::MetadataLookup`] (or any provider
    /// error) on failure; callers treat this as non-fatal.
    fn lookup(&self, name: &str, version: &str) -> Result<Option<PackageMetadata>>;
}

/// A provider that knows nothing. Discovery still records every declared
/// dependency; transitive expansion is simply empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMetadataProvider;

impl PackageMetadataProvider for NullMetadataProvider {
    fn lookup(&self, _name: &str, _version: &str) -> Result<Option<PackageMetadata>> {
        Ok(None)
    }
}

/// Per-run memoization wrapper around a provider.
///
/// The cache is keyed by (name, version) and shared read-mostly across the
/// parallel per-project evaluations; failed lookups are cached as misses so
/// a flaky package is queried once per run, not once per project.
pub struct MetadataCache<'a> {
    provider: &'a dyn PackageMetadataProvider,
    memo: Mutex<HashMap<(String, String), Option<PackageMetadata>>>,
}

impl<'a> MetadataCache<'a> {
    /// Wraps `provider` with a fresh per-run cache.
    pub fn new(provider: &'a dyn PackageMetadataProvider) -> Self {
        Self {
            provider,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Memoized lookup. Lookup failures are logged and degrade to `None`.
    pub fn get(&self, name: &str, version: &str) -> Option<PackageMetadata> {
        let key = (name.to_ascii_lowercase(), version.to_string());
        if let Ok(memo) = self.memo.lock() {
            if let Some(cached) = memo.get(&key) {
                return cached.clone();
            }
        }

        let looked_up = match self.provider.lookup(name, version) {
            Ok(metadata) => metadata,
            Err(error) => {
                tracing::warn!(
                    package = name,
                    version,
                    error = %error,
                    "Metadata lookup failed - transitive children omitted for this dependency"
                );
                None
            }
        };

        if let Ok(mut memo) = self.memo.lock() {
            memo.insert(key, looked_up.clone());
        }
        looked_up
    }
}
