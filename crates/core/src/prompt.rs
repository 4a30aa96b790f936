//! Interactive solicitation: deciding when to prompt, and driving the
//! validate/retry loop around the injected input collaborator.

use std::collections::HashSet;

use log::{debug, warn};

use crate::definitions::{ParameterDefinition, PromptPolicy, PromptRepeat, PromptTiming};
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::value::Value;

/// Where execution currently stands when a prompt decision is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptContext {
    /// Startup resolution, before any command runs.
    AtStart,
    /// Immediately before the named command runs.
    BeforeCommand(String),
}

/// The outcome of the decision rules for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptDecision {
    Skip,
    Required,
}

/// Which parameters have already been solicited this session. Consulted only
/// for `repeat: never` policies; grows until explicitly cleared.
#[derive(Debug, Default)]
pub struct PromptHistory {
    solicited: HashSet<String>,
}

impl PromptHistory {
    pub fn record(&mut self, name: &str) {
        self.solicited.insert(name.to_string());
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.solicited.contains(name)
    }

    pub fn clear(&mut self) {
        self.solicited.clear();
    }
}

/// The input collaborator: something that can put a question to the user and
/// return their raw answer.
pub trait PromptInput {
    /// Ask for a value. `choices`, when present, is the ordered allowed-value
    /// list to offer. `hide_echo` requests no-echo input for sensitive
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    fn solicit(
        &mut self,
        prompt_text: &str,
        hide_echo: bool,
        choices: Option<&[Value]>,
    ) -> Result<String>;
}

/// Apply the decision rules, in order, for one parameter.
#[must_use]
pub fn decide(
    policy: &PromptPolicy,
    context: &PromptContext,
    set_from_cli: bool,
    current: Option<&Value>,
    history: &PromptHistory,
    name: &str,
) -> PromptDecision {
    // 1. Command-line input always pre-empts prompting
    if set_from_cli {
        return PromptDecision::Skip;
    }

    // 2. Never-repeat parameters are asked at most once per session
    if policy.repeat == PromptRepeat::Never && history.contains(name) {
        return PromptDecision::Skip;
    }

    // 3. The timing must match the execution context
    let timing_matches = match policy.timing {
        PromptTiming::OnStart => *context == PromptContext::AtStart,
        PromptTiming::OnCommand => matches!(context, PromptContext::BeforeCommand(_)),
    };
    if !timing_matches {
        return PromptDecision::Skip;
    }

    // 4. If-blank parameters are satisfied by any non-blank value
    if policy.repeat == PromptRepeat::IfBlank
        && current.is_some_and(|value| !value.is_blank())
    {
        return PromptDecision::Skip;
    }

    PromptDecision::Required
}

/// Run one prompt pass over every parameter with a prompt policy.
///
/// Solicited values go through the normal `set` path, so switch-group and
/// immutability rules apply unchanged. Invalid input is re-requested up to
/// the policy's retry limit.
///
/// # Errors
///
/// Returns `PromptValidationExhausted` when a parameter's retry budget runs
/// out, or any terminal assignment error (conflict, immutability, IO).
pub fn run_prompt_phase(
    registry: &mut Registry,
    context: &PromptContext,
    input: &mut dyn PromptInput,
) -> Result<()> {
    let candidates: Vec<ParameterDefinition> = registry
        .definitions()
        .filter(|definition| definition.prompt.is_some())
        .cloned()
        .collect();

    for definition in candidates {
        let Some(policy) = definition.prompt.clone() else {
            continue;
        };

        let set_from_cli = registry.is_set_from_cli(&definition.name)?;
        let current = registry.get(&definition.name)?;
        let decision = decide(
            &policy,
            context,
            set_from_cli,
            current.as_ref(),
            &registry.prompt_history,
            &definition.name,
        );

        if decision == PromptDecision::Skip {
            debug!("Skipping prompt for `{}`", definition.name);
            continue;
        }

        solicit_value(registry, &definition, &policy, current, input)?;
        registry.prompt_history.record(&definition.name);
    }

    Ok(())
}

fn build_prompt_text(
    definition: &ParameterDefinition,
    current: Option<&Value>,
    sensitive: bool,
) -> String {
    let base = format!("Value for {definition}");

    // Never echo a sensitive parameter's current value back
    match current {
        Some(current) if !sensitive => format!("{base} [{current}]"),
        _ => base,
    }
}

fn solicit_value(
    registry: &mut Registry,
    definition: &ParameterDefinition,
    policy: &PromptPolicy,
    current: Option<Value>,
    input: &mut dyn PromptInput,
) -> Result<()> {
    let prompt_text = build_prompt_text(definition, current.as_ref(), policy.sensitive);
    let mut attempts = 0;

    while attempts < policy.retry_limit {
        let raw = input.solicit(
            &prompt_text,
            policy.sensitive,
            definition.allowed_values.as_deref(),
        )?;

        if raw.trim().is_empty() {
            if current.is_some() {
                // Blank input accepts the value already held
                return Ok(());
            }
            attempts += 1;
            continue;
        }

        match registry.set_input(&definition.name, &[raw]) {
            Ok(()) => return Ok(()),
            Err(error) if error.is_retryable_input() => {
                warn!("Rejected input for `{}`: {error}", definition.name);
                attempts += 1;
            }
            // Conflicts, immutability and IO failures are terminal
            Err(error) => return Err(error),
        }
    }

    Err(Error::PromptValidationExhausted {
        name: definition.name.clone(),
        attempts,
    })
}
