//! Target-framework resolution.
//!
//! `TargetFrameworks` (plural, semicolon-separated) is preferred over
//! `TargetFramework`. Resolution is fail-closed: if the resolved value still
//! contains a property reference, the whole project is dropped - dependency
//! conditions keyed on an unknown framework cannot be trusted.

use crate::properties::PropertyModel;
use nudge_core::{Error, Result};
use std::path::Path;

/// Splits a resolved framework property into ordered, deduplicated monikers.
fn split_monikers(value: &str) -> Vec<String> {
    let mut monikers: Vec<String> = Vec::new();
    for part in value.split(';') {
        let part = part.trim();
        if !part.is_empty() && !monikers.iter().any(|m| m == part) {
            monikers.push(part.to_string());
        }
    }
    monikers
}

/// Resolves the project's concrete target frameworks from its accumulated
/// property model.
///
/// Returns an empty set when neither framework property is assigned (shared
/// build files typically have none).
///
/// # Errors
///
/// Returns [`Error::UnresolvableTargetFramework`] when the winning value
/// still contains an unresolved `$(...)` reference.
pub fn resolve_frameworks(model: &PropertyModel, project: &Path) -> Result<Vec<String>> {
    let value = model
        .value_of("TargetFrameworks")
        .filter(|v| !v.trim().is_empty())
        .or_else(|| model.value_of("TargetFramework"))
        .unwrap_or("");

    if value.contains("$(") {
        return Err(Error::UnresolvableTargetFramework {
            path: project.to_path_buf(),
            value: value.to_string(),
        });
    }
    Ok(split_monikers(value))
}
