//! Grouping and application of `-p name=value` assignment tokens.
//!
//! Tokenisation proper (flag splitting, quoting) is clap's job; this module
//! receives the already-extracted token strings, groups them into one
//! assignment per parameter name, and feeds them to the registry inside a
//! batch pass.

use indexmap::IndexMap;
use log::debug;

use switchyard_core::definitions::ParameterKind;
use switchyard_core::error::Error::{ParameterFormat, UnknownParameter};
use switchyard_core::error::Result;
use switchyard_core::registry::Registry;
use switchyard_core::value::Value;

/// One raw fragment of an assignment: `name=value` carries a value, a bare
/// `name` token does not (toggle shorthand).
pub type Fragment = Option<String>;

/// Group raw `name=value` tokens by parameter name, in encounter order.
///
/// Repeated names become several fragments of a single assignment.
///
/// # Errors
///
/// Returns `ParameterFormat` for tokens with an empty name.
pub fn group_assignments(parameters: &[String]) -> Result<IndexMap<String, Vec<Fragment>>> {
    let mut grouped: IndexMap<String, Vec<Fragment>> = IndexMap::new();

    for token in parameters {
        let (name, fragment) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (token.as_str(), None),
        };

        if name.is_empty() {
            return Err(ParameterFormat(token.clone()));
        }

        grouped.entry(name.to_string()).or_default().push(fragment);
    }

    Ok(grouped)
}

/// Apply grouped assignments through the registry.
///
/// The caller is expected to hold a batch guard, so switch groups reject
/// conflicts between command-line tokens. Each name's fragments form one
/// assignment call; the registry merges them left to right.
///
/// # Errors
///
/// Returns `ParameterFormat` when a bare token names a non-toggle
/// parameter or is mixed with valued fragments, plus any registry error.
pub fn apply_assignments(
    registry: &mut Registry,
    assignments: &IndexMap<String, Vec<Fragment>>,
) -> Result<()> {
    for (name, fragments) in assignments {
        debug!("Applying {} fragment(s) to `{}`", fragments.len(), name);

        if fragments.iter().all(Option::is_some) {
            let raws: Vec<String> = fragments.iter().flatten().cloned().collect();
            registry.set_input(name, &raws)?;
            continue;
        }

        // A bare token flips a toggle's default; it cannot carry fragments
        if fragments.len() != 1 {
            return Err(ParameterFormat(name.clone()));
        }

        let definition = registry
            .definition_for(name)
            .ok_or_else(|| UnknownParameter(name.clone()))?;
        if !matches!(definition.kind, ParameterKind::Toggle) {
            return Err(ParameterFormat(name.clone()));
        }

        let default_truthy = definition
            .default
            .as_ref()
            .is_some_and(Value::is_truthy);
        registry.set(name, Value::Toggle(!default_truthy))?;
    }

    Ok(())
}
