//! Keyed merging of dependency records.
//!
//! Records accumulate in parse/override order. Identity is `(name, kind)`
//! with case-insensitive names: a later-evaluated record for the same
//! identity overrides the earlier one's version and unions its framework
//! set instead of duplicating.

use nudge_core::{Dependency, DependencyKind};
use std::collections::HashMap;

/// Accumulates dependency records for one file result.
#[derive(Debug, Default)]
pub struct DependencyAggregator {
    records: Vec<Dependency>,
    /// (lowercased name, kind) -> position in `records`.
    index: HashMap<(String, DependencyKind), usize>,
}

impl DependencyAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The kind of the first record carrying `name`, if any.
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<DependencyKind> {
        self.records
            .iter()
            .find(|record| record.name.eq_ignore_ascii_case(name))
            .map(|record| record.kind)
    }

    /// Merges one record.
    ///
    /// A new identity appends; an existing identity is overridden in place:
    /// the later record's non-empty version wins, framework sets union
    /// (preserving first-seen order), and the direct/update flags
    /// accumulate.
    pub fn merge(&mut self, dep: Dependency) {
        let key = (dep.name.to_ascii_lowercase(), dep.kind);
        let Some(&pos) = self.index.get(&key) else {
            self.index.insert(key, self.records.len());
            self.records.push(dep);
            return;
        };

        let existing = &mut self.records[pos];
        match &dep.version {
            Some(version) if !version.is_empty() || existing.version.is_none() => {
                existing.version = dep.version;
                existing.is_unresolved = dep.is_unresolved;
                existing.declared_in = dep.declared_in;
            }
            _ => {}
        }
        for framework in dep.target_frameworks {
            if !existing
                .target_frameworks
                .iter()
                .any(|f| f.eq_ignore_ascii_case(&framework))
            {
                existing.target_frameworks.push(framework);
            }
        }
        existing.is_direct |= dep.is_direct;
        existing.is_update |= dep.is_update;
    }

    /// Overrides the version of an existing same-named record, whatever its
    /// kind. Used by the wildcard update expansion, which decorates existing
    /// items and never creates records. The unresolved flag follows the
    /// stored value.
    pub fn set_version_if_present(&mut self, name: &str, version: &str) {
        if let Some(record) = self
            .records
            .iter_mut()
            .find(|record| record.name.eq_ignore_ascii_case(name))
        {
            record.version = Some(version.to_string());
            record.is_unresolved = version.contains("$(");
        }
    }

    /// A read-only view of the accumulated records.
    #[must_use]
    pub fn records(&self) -> &[Dependency] {
        &self.records
    }

    /// Finishes aggregation, returning records in insertion order.
    #[must_use]
    pub fn into_records(self) -> Vec<Dependency> {
        self.records
    }
}
