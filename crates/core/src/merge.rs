//! The merge engine behind `join` accumulation.
//!
//! Text concatenates with the parameter's separator, sequences append in
//! encounter order, and mappings merge shallowly or deeply under the
//! parameter's override strategy. Numbers and toggles do not accumulate.

use indexmap::IndexMap;

use crate::definitions::{DictMerge, DictOverride, ParameterDefinition, ParameterKind};
use crate::error::{Error, Result};
use crate::value::Value;

/// Combine a stored value with a newly supplied one.
///
/// `current` is the explicitly stored value, or `None` when the parameter is
/// unset — a held default is not accumulated onto, it is replaced.
///
/// # Errors
///
/// Returns `UnsupportedJoin` for number and toggle parameters.
pub fn join(
    definition: &ParameterDefinition,
    current: Option<Value>,
    incoming: Value,
) -> Result<Value> {
    if !definition.kind.supports_join() {
        return Err(Error::UnsupportedJoin {
            name: definition.name.clone(),
            kind: definition.kind,
        });
    }

    let Some(current) = current else {
        return Ok(incoming);
    };

    match definition.kind {
        ParameterKind::Text => join_text(definition, &current, &incoming),
        ParameterKind::Sequence => join_sequences(current, incoming),
        ParameterKind::Mapping => join_mappings(definition, current, incoming),
        ParameterKind::Number | ParameterKind::Toggle => unreachable!("rejected above"),
    }
}

/// Fold several values supplied in a single assignment call into one,
/// pairwise, left to right. A single value passes through untouched, so
/// plain assignment of non-joinable kinds is unaffected.
pub fn join_fragments(definition: &ParameterDefinition, values: Vec<Value>) -> Result<Value> {
    let mut iterator = values.into_iter();
    let Some(mut merged) = iterator.next() else {
        return Err(Error::TypeConversion {
            name: definition.name.clone(),
            expected: definition.kind,
            raw: String::new(),
        });
    };

    for value in iterator {
        merged = join(definition, Some(merged), value)?;
    }

    Ok(merged)
}

fn join_text(
    definition: &ParameterDefinition,
    current: &Value,
    incoming: &Value,
) -> Result<Value> {
    let (Some(current), Some(incoming)) = (current.as_text(), incoming.as_text()) else {
        return Err(Error::TypeConversion {
            name: definition.name.clone(),
            expected: ParameterKind::Text,
            raw: incoming.to_string(),
        });
    };

    Ok(Value::Text(format!(
        "{current}{}{incoming}",
        definition.separator()
    )))
}

fn join_sequences(current: Value, incoming: Value) -> Result<Value> {
    let mut elements = match current {
        Value::Sequence(elements) => elements,
        other => vec![other],
    };

    match incoming {
        Value::Sequence(incoming_elements) => elements.extend(incoming_elements),
        other => elements.push(other),
    }

    // Duplicates are permitted; encounter order is kept
    Ok(Value::Sequence(elements))
}

fn join_mappings(
    definition: &ParameterDefinition,
    current: Value,
    incoming: Value,
) -> Result<Value> {
    let (Value::Mapping(current), Value::Mapping(incoming)) = (current, incoming) else {
        return Err(Error::TypeConversion {
            name: definition.name.clone(),
            expected: ParameterKind::Mapping,
            raw: String::new(),
        });
    };

    Ok(Value::Mapping(merge_mappings(
        current,
        incoming,
        definition.dict_merge,
        definition.dict_override,
    )))
}

fn merge_mappings(
    mut current: IndexMap<String, Value>,
    incoming: IndexMap<String, Value>,
    depth: DictMerge,
    strategy: DictOverride,
) -> IndexMap<String, Value> {
    for (key, incoming_value) in incoming {
        match current.get_mut(&key) {
            None => {
                current.insert(key, incoming_value);
            }
            Some(existing) => match (depth, existing, incoming_value) {
                // Nested mappings merge recursively under the same rules
                (DictMerge::Deep, Value::Mapping(nested), Value::Mapping(incoming_nested)) => {
                    let merged =
                        merge_mappings(std::mem::take(nested), incoming_nested, depth, strategy);
                    *nested = merged;
                }
                // Leaf collision, or a shape mismatch: the override strategy
                // decides regardless of shape
                (_, existing, incoming_value) => {
                    if strategy == DictOverride::LastWins {
                        *existing = incoming_value;
                    }
                }
            },
        }
    }

    current
}
