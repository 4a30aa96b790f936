//! Type validation and allowed-value normalisation.
//!
//! Each parameter kind has one validator, selected by matching on
//! [`ParameterKind`]. Raw command-line or prompt input enters through
//! [`parse_input`]; already-typed values enter through [`check`]. Both paths
//! end in the same conformance and allowed-value rules, so a value is stored
//! identically no matter where it came from.

use crate::definitions::{ParameterDefinition, ParameterKind};
use crate::error::{Error, Result};
use crate::value::Value;

/// Literals accepted as an affirmative toggle value.
const AFFIRMATIVE: [&str; 4] = ["true", "yes", "on", "1"];
/// Literals accepted as a negative toggle value.
const NEGATIVE: [&str; 4] = ["false", "no", "off", "0"];

/// Parse one raw input fragment for a parameter, applying its input filter,
/// then validate and normalise the result.
///
/// Mapping parameters expect a JSON fragment. Sequence parameters accept a
/// JSON array, or a single bare value which becomes a one-element sequence.
///
/// # Errors
///
/// Returns a type-conversion, JSON or disallowed-value error when the
/// fragment cannot become a valid value for the parameter.
pub fn parse_input(definition: &ParameterDefinition, raw: &str) -> Result<Value> {
    let filtered = definition.filter_input(raw);

    let candidate = match definition.kind {
        ParameterKind::Mapping => parse_structured(definition, &filtered)?,
        ParameterKind::Sequence if filtered.trim_start().starts_with('[') => {
            parse_structured(definition, &filtered)?
        }
        _ => Value::Text(filtered),
    };

    check(definition, candidate)
}

/// Validate and normalise an already-typed value: conform it to the declared
/// kind, then rewrite it to canonical case against the allowed-value list.
///
/// # Errors
///
/// Returns a type-conversion error for kind mismatches and a
/// disallowed-value error when the value is not in the allowed set.
pub fn check(definition: &ParameterDefinition, value: Value) -> Result<Value> {
    let conformed = conform(definition, value)?;
    normalise(definition, conformed)
}

/// Validate the declared allowed-value list itself: every entry must conform
/// to the parameter's kind. Run once at registration.
pub fn check_allowed_list(definition: &ParameterDefinition) -> Result<()> {
    let Some(allowed) = &definition.allowed_values else {
        return Ok(());
    };

    for entry in allowed {
        conform(definition, entry.clone())?;
    }

    Ok(())
}

fn parse_structured(definition: &ParameterDefinition, raw: &str) -> Result<Value> {
    serde_json::from_str::<Value>(raw).map_err(|original| Error::Json {
        name: definition.name.clone(),
        original,
    })
}

fn conversion_error(definition: &ParameterDefinition, value: &Value) -> Error {
    Error::TypeConversion {
        name: definition.name.clone(),
        expected: definition.kind,
        raw: value.to_string(),
    }
}

/// Coerce a value to the declared kind, or fail.
fn conform(definition: &ParameterDefinition, value: Value) -> Result<Value> {
    match definition.kind {
        ParameterKind::Text => match value.as_text() {
            Some(text) => Ok(Value::Text(text)),
            None => Err(conversion_error(definition, &value)),
        },
        ParameterKind::Number => conform_number(definition, value),
        ParameterKind::Toggle => conform_toggle(definition, value),
        ParameterKind::Sequence => conform_sequence(definition, value),
        ParameterKind::Mapping => match value {
            Value::Mapping(_) => Ok(value),
            other => Err(conversion_error(definition, &other)),
        },
    }
}

fn conform_number(definition: &ParameterDefinition, value: Value) -> Result<Value> {
    match value {
        Value::Integer(_) | Value::Float(_) => Ok(value),
        // Integer first so whole numbers round-trip without a float form
        Value::Text(text) => {
            let trimmed = text.trim();
            if let Ok(number) = trimmed.parse::<i64>() {
                Ok(Value::Integer(number))
            } else if let Ok(number) = trimmed.parse::<f64>() {
                Ok(Value::Float(number))
            } else {
                Err(conversion_error(definition, &Value::Text(text)))
            }
        }
        other => Err(conversion_error(definition, &other)),
    }
}

fn conform_toggle(definition: &ParameterDefinition, value: Value) -> Result<Value> {
    match value {
        Value::Toggle(_) => Ok(value),
        Value::Text(text) => {
            let lowered = text.trim().to_lowercase();
            if AFFIRMATIVE.contains(&lowered.as_str()) {
                Ok(Value::Toggle(true))
            } else if NEGATIVE.contains(&lowered.as_str()) {
                Ok(Value::Toggle(false))
            } else {
                Err(conversion_error(definition, &Value::Text(text)))
            }
        }
        other => Err(conversion_error(definition, &other)),
    }
}

fn conform_sequence(definition: &ParameterDefinition, value: Value) -> Result<Value> {
    let elements = match value {
        Value::Sequence(elements) => elements,
        // A bare scalar becomes a one-element sequence
        scalar => vec![scalar],
    };

    let mut conformed = Vec::with_capacity(elements.len());
    for element in elements {
        // Elements are validated as text
        match element.as_text() {
            Some(text) => conformed.push(Value::Text(text)),
            None => return Err(conversion_error(definition, &element)),
        }
    }

    Ok(Value::Sequence(conformed))
}

/// Rewrite a conformed value to the canonical case stored in the
/// allowed-value list. Idempotent: a canonical value passes through
/// unchanged. Toggle and mapping parameters have no allowed-value checks.
fn normalise(definition: &ParameterDefinition, value: Value) -> Result<Value> {
    let Some(allowed) = &definition.allowed_values else {
        return Ok(value);
    };

    match definition.kind {
        ParameterKind::Text => normalise_text(definition, allowed, value),
        ParameterKind::Number => normalise_number(definition, allowed, value),
        ParameterKind::Sequence => {
            let Value::Sequence(elements) = value else {
                return Ok(value);
            };
            let mut normalised = Vec::with_capacity(elements.len());
            for element in elements {
                normalised.push(normalise_text(definition, allowed, element)?);
            }
            Ok(Value::Sequence(normalised))
        }
        ParameterKind::Toggle | ParameterKind::Mapping => Ok(value),
    }
}

fn disallowed_error(definition: &ParameterDefinition, allowed: &[Value], value: &Value) -> Error {
    Error::DisallowedValue {
        name: definition.name.clone(),
        value: value.to_string(),
        allowed: allowed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn normalise_text(
    definition: &ParameterDefinition,
    allowed: &[Value],
    value: Value,
) -> Result<Value> {
    let Some(text) = value.as_text() else {
        return Err(conversion_error(definition, &value));
    };

    // Linear scan; allowed lists are expected to stay small
    for entry in allowed {
        if let Some(canonical) = entry.as_text() {
            if canonical.eq_ignore_ascii_case(&text) {
                return Ok(Value::Text(canonical));
            }
        }
    }

    Err(disallowed_error(definition, allowed, &value))
}

fn normalise_number(
    definition: &ParameterDefinition,
    allowed: &[Value],
    value: Value,
) -> Result<Value> {
    let number = value.as_number();

    // Exact match, no folding of any kind
    let matched = allowed
        .iter()
        .any(|entry| entry.as_number().is_some() && entry.as_number() == number);

    if matched {
        Ok(value)
    } else {
        Err(disallowed_error(definition, allowed, &value))
    }
}
