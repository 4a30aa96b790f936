//! Mutual exclusion within switch groups.
//!
//! The resolver is pure: from the definitions, the stored values and a
//! transient context it computes either an eviction plan or a rejection.
//! The registry executes the plan, so a rejected operation never touches
//! stored state.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::definitions::{ParameterDefinition, ParameterKind, SwitchPolicy};
use crate::error::{Error, Result};
use crate::registry::StoredValue;

/// Transient flags threaded into conflict resolution.
///
/// `registration` suppresses all checks — defaults never conflict while
/// being registered or loaded from the settings store. `batch` forces the
/// policy to reject for the duration of a command-line parse pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictContext {
    pub registration: bool,
    pub batch: bool,
}

/// One member of the group that must make way before the new value lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eviction {
    Unset(String),
    Reset(String),
}

/// Decide what must happen before `definition` may take a new value.
///
/// Returns the (possibly empty) list of evictions to execute first.
///
/// # Errors
///
/// Returns `SwitchConflict` when the effective policy is reject and another
/// group member is active.
pub fn resolve(
    definition: &ParameterDefinition,
    definitions: &IndexMap<String, ParameterDefinition>,
    values: &HashMap<String, StoredValue>,
    context: ConflictContext,
) -> Result<Vec<Eviction>> {
    if context.registration {
        return Ok(Vec::new());
    }

    let Some(group) = &definition.switch_group else {
        return Ok(Vec::new());
    };

    let policy = if context.batch {
        SwitchPolicy::Reject
    } else {
        definition.switch_change_behavior
    };

    let mut evictions = Vec::new();

    for member in definitions.values() {
        if member.name == definition.name || member.switch_group.as_ref() != Some(group) {
            continue;
        }

        let Some(stored) = values.get(member.storage_key()) else {
            continue;
        };

        if !is_active(member, stored) {
            continue;
        }

        match policy {
            SwitchPolicy::Reject => {
                return Err(Error::SwitchConflict {
                    name: definition.name.clone(),
                    conflicting: member.name.clone(),
                    group: group.clone(),
                });
            }
            SwitchPolicy::Unset => evictions.push(Eviction::Unset(member.name.clone())),
            SwitchPolicy::Reset => evictions.push(Eviction::Reset(member.name.clone())),
        }
    }

    Ok(evictions)
}

/// Whether a group member blocks others. Judged by the *member's* kind:
/// a toggle blocks only while set truthy; any other kind blocks whenever it
/// is explicitly set.
fn is_active(member: &ParameterDefinition, stored: &StoredValue) -> bool {
    if !stored.is_set {
        return false;
    }

    match member.kind {
        ParameterKind::Toggle => stored.value.is_truthy(),
        _ => true,
    }
}
