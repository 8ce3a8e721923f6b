//! Document-to-record evaluation shared by project and central-file paths.

use crate::aggregate::DependencyAggregator;
use crate::central::CentralState;
use nudge_core::{Dependency, DependencyKind, Result};
use nudge_msbuild::document::{DependencyItem, ItemKind, ProjectDocument};
use nudge_msbuild::expr::{self, FrameworkScope};
use nudge_msbuild::properties::PropertyModel;

/// The wildcard update target that stands for every `GlobalPackageReference`.
pub(crate) const GLOBAL_WILDCARD: &str = "@(GlobalPackageReference)";

/// Applies a document's property groups to the model, in document order.
pub(crate) fn apply_property_groups(doc: &ProjectDocument, model: &mut PropertyModel) -> Result<()> {
    for group in &doc.property_groups {
        for (name, raw) in &group.properties {
            model.set(name, raw, group.condition.as_deref(), &doc.path)?;
        }
    }
    Ok(())
}

/// The frameworks under which an item group applies, or `None` when the
/// group is skipped entirely.
///
/// A conditioned group is evaluated once per resolved framework with
/// `TargetFramework` bound; with no resolved frameworks it is evaluated
/// once against the bare model. A group visible under at least one
/// framework applies under the project's whole framework set - per-context
/// visibility decides inclusion, and included records union into the full
/// set.
pub(crate) fn group_frameworks(
    condition: Option<&str>,
    model: &PropertyModel,
    frameworks: &[String],
) -> Result<Option<Vec<String>>> {
    let Some(condition) = condition else {
        return Ok(Some(frameworks.to_vec()));
    };
    if frameworks.is_empty() {
        return Ok(expr::evaluate_condition(condition, model)?.then(Vec::new));
    }

    for framework in frameworks {
        let scope = FrameworkScope::new(model, framework);
        if expr::evaluate_condition(condition, &scope)? {
            return Ok(Some(frameworks.to_vec()));
        }
    }
    Ok(None)
}

/// Merges the synthetic MSBuildSdk records a document contributes: one for
/// the root `Sdk` attribute (no version), one per `<Sdk>` element import.
pub(crate) fn merge_sdk_records(doc: &ProjectDocument, agg: &mut DependencyAggregator) {
    if let Some(sdk) = &doc.sdk {
        agg.merge(Dependency::new(
            sdk,
            None,
            DependencyKind::MsBuildSdk,
            &doc.path,
        ));
    }
    for import in &doc.sdk_imports {
        agg.merge(Dependency::new(
            &import.name,
            import.version.clone(),
            DependencyKind::MsBuildSdk,
            &doc.path,
        ));
    }
}

/// Merges a document's dependency items into the aggregator.
///
/// `is_own` marks records from the project's own file as direct; shared
/// build files contribute `is_direct=false` records to project results and
/// pass `true` when evaluated as their own entry.
pub(crate) fn merge_items(
    doc: &ProjectDocument,
    model: &PropertyModel,
    frameworks: &[String],
    central: &CentralState,
    is_own: bool,
    agg: &mut DependencyAggregator,
) -> Result<()> {
    for group in &doc.item_groups {
        let Some(active) = group_frameworks(group.condition.as_deref(), model, frameworks)? else {
            continue;
        };
        for item in &group.items {
            // The item's own condition gates it the same way a group
            // condition gates the group.
            let Some(active) = group_frameworks(item.condition.as_deref(), model, &active)? else {
                continue;
            };
            merge_item(item, doc, model, &active, central, is_own, agg);
        }
    }
    Ok(())
}

fn merge_item(
    item: &DependencyItem,
    doc: &ProjectDocument,
    model: &PropertyModel,
    active: &[String],
    central: &CentralState,
    is_own: bool,
    agg: &mut DependencyAggregator,
) {
    let kind = match item.kind {
        ItemKind::PackageReference => DependencyKind::PackageReference,
        ItemKind::PackageVersion => DependencyKind::PackageVersion,
        ItemKind::GlobalPackageReference => DependencyKind::GlobalPackageReference,
    };

    let (raw_name, is_update) = match (&item.include, &item.update) {
        (Some(include), _) => (include.as_str(), false),
        (None, Some(update)) => (update.as_str(), true),
        (None, None) => {
            tracing::trace!(file = %doc.path.display(), "Item without Include or Update ignored");
            return;
        }
    };

    if is_update && raw_name.trim().eq_ignore_ascii_case(GLOBAL_WILDCARD) {
        // Expands to the concrete global items; decorates, never creates.
        if let Some(raw) = item.raw_version() {
            let version = expr::expand(raw, model).value;
            for (global_name, _) in central.global_references() {
                agg.set_version_if_present(global_name, &version);
            }
        }
        return;
    }

    let name = expr::expand(raw_name, model).value;
    let (version, is_unresolved) = match item.raw_version() {
        Some(raw) => {
            let expansion = expr::expand(raw, model);
            (Some(expansion.value), !expansion.fully_resolved)
        }
        None => {
            let inherited = if central.enabled() {
                if is_update {
                    central.update_version_for(&name)
                } else {
                    central.version_for(&name)
                }
            } else {
                None
            };
            (Some(inherited.unwrap_or_default().to_string()), false)
        }
    };

    agg.merge(Dependency {
        name,
        version,
        kind,
        is_direct: is_own,
        is_transitive: false,
        is_update,
        is_unresolved,
        target_frameworks: active.to_vec(),
        declared_in: doc.path.clone(),
    });
}
