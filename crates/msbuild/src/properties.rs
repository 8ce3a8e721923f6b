//! Ordered property accumulation with override rules.

use crate::expr::{self, PropertyScope};
use nudge_core::{Property, Result};
use std::collections::HashMap;
use std::path::Path;

/// Accumulates property assignments across property groups.
///
/// Assignments apply in file-import order; a later assignment whose
/// condition is satisfied (or absent) overrides an earlier same-named one.
/// The model keeps the first-assignment position of each name so the
/// reported property list follows parse order, and tracks the originating
/// file of the winning assignment for diagnostics.
///
/// The model is transient: it is scoped to one discovery run and never
/// persisted.
#[derive(Debug, Default)]
pub struct PropertyModel {
    entries: Vec<Property>,
    /// Lowercased name -> position in `entries`.
    index: HashMap<String, usize>,
    /// Running assignment counter; the winning entry keeps the sequence
    /// number of the write that produced it.
    next_order: usize,
}

impl PropertyModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one assignment.
    ///
    /// The condition (if any) is evaluated against the model as accumulated
    /// so far; an unsatisfied condition skips the assignment. The raw value
    /// is expanded immediately, so later lookups see the resolved value -
    /// or the raw expression when resolution genuinely failed.
    ///
    /// # Errors
    ///
    /// Returns [`nudge_core::Error::Condition`] when the condition has
    /// malformed syntax.
    pub fn set(
        &mut self,
        name: &str,
        raw: &str,
        condition: Option<&str>,
        file: &Path,
    ) -> Result<()> {
        if let Some(cond) = condition {
            if !expr::evaluate_condition(cond, self)? {
                tracing::trace!(
                    property = name,
                    condition = cond,
                    "Skipping assignment with unsatisfied condition"
                );
                return Ok(());
            }
        }

        let expansion = expr::expand(raw, self);
        let order = self.next_order;
        self.next_order += 1;

        let entry = Property {
            name: name.to_string(),
            raw: raw.to_string(),
            resolved: expansion.value,
            condition: condition.map(str::to_string),
            defined_in: file.to_path_buf(),
            order,
        };

        let key = name.to_ascii_lowercase();
        if let Some(&pos) = self.index.get(&key) {
            self.entries[pos] = entry;
        } else {
            self.index.insert(key, self.entries.len());
            self.entries.push(entry);
        }
        Ok(())
    }

    /// Last resolved-or-raw value for `name` (case-insensitive).
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.index
            .get(&name.to_ascii_lowercase())
            .map(|&pos| self.entries[pos].resolved.as_str())
    }

    /// The winning assignments in first-assignment order.
    #[must_use]
    pub fn report(&self) -> Vec<Property> {
        self.entries.clone()
    }
}

impl PropertyScope for PropertyModel {
    fn value_of(&self, name: &str) -> Option<&str> {
        Self::value_of(self, name)
    }
}
