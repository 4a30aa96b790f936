use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// The declared type of a parameter.
///
/// Every registered parameter carries exactly one kind, and the kind selects
/// the validator, normaliser and merge behaviour applied to its values.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Text,
    Number,
    Toggle,
    Sequence,
    Mapping,
}

impl ParameterKind {
    /// Whether `join` (accumulation) is defined for this kind.
    #[must_use]
    pub fn supports_join(self) -> bool {
        !matches!(self, ParameterKind::Number | ParameterKind::Toggle)
    }
}

impl Display for ParameterKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ParameterKind::Text => "text",
            ParameterKind::Number => "number",
            ParameterKind::Toggle => "toggle",
            ParameterKind::Sequence => "sequence",
            ParameterKind::Mapping => "mapping",
        };
        formatter.write_str(name)
    }
}

/// What happens when setting a parameter whose switch group already has an
/// active member.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SwitchPolicy {
    /// Refuse the new value and report the conflict.
    #[default]
    Reject,
    /// Clear the conflicting members entirely, then apply the new value.
    Unset,
    /// Restore the conflicting members to their defaults, then apply.
    Reset,
}

impl Display for SwitchPolicy {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SwitchPolicy::Reject => "reject",
            SwitchPolicy::Unset => "unset",
            SwitchPolicy::Reset => "reset",
        };
        formatter.write_str(name)
    }
}

/// Depth of mapping accumulation.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DictMerge {
    /// Top-level keys only; nested values are treated as leaves.
    #[default]
    Shallow,
    /// Nested mappings are merged recursively.
    Deep,
}

/// Which side wins when mapping keys collide during accumulation.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DictOverride {
    /// Keep the value already stored.
    FirstWins,
    /// Take the newly supplied value.
    #[default]
    LastWins,
}

/// A transform applied to raw input before type validation.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputFilter {
    Trim,
    Lowercase,
    Uppercase,
    /// Expand a leading `~` to the user's home directory.
    ExpandUser,
}

impl InputFilter {
    #[must_use]
    pub fn apply(self, raw: &str) -> String {
        match self {
            InputFilter::Trim => raw.trim().to_string(),
            InputFilter::Lowercase => raw.to_lowercase(),
            InputFilter::Uppercase => raw.to_uppercase(),
            InputFilter::ExpandUser => shellexpand::tilde(raw).to_string(),
        }
    }
}

/// When a parameter may be solicited interactively.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PromptTiming {
    /// Before any command runs, as part of startup resolution.
    #[default]
    OnStart,
    /// Immediately before a named command runs.
    OnCommand,
}

/// Whether a parameter may be solicited again once it has a value.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PromptRepeat {
    /// At most once per process (tracked in the prompt history).
    #[default]
    Never,
    /// Again whenever the current value is blank.
    IfBlank,
    /// Every time the timing matches.
    Always,
}

fn default_retry_limit() -> u32 {
    3
}

/// Timing and repeat rules for interactive solicitation of a parameter.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PromptPolicy {
    #[serde(default)]
    pub timing: PromptTiming,
    #[serde(default)]
    pub repeat: PromptRepeat,
    /// Input is read without echo when set.
    #[serde(default)]
    pub sensitive: bool,
    /// How many invalid inputs are tolerated before the solicitation fails.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
}

impl Default for PromptPolicy {
    fn default() -> Self {
        Self {
            timing: PromptTiming::default(),
            repeat: PromptRepeat::default(),
            sensitive: false,
            retry_limit: default_retry_limit(),
        }
    }
}

/// A registered parameter. Immutable once the registry accepts it.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ParameterDefinition {
    /// Unique lookup key.
    pub name: String,
    /// Storage key for values and the settings store. Defaults to `name`.
    pub bind_name: Option<String>,
    pub kind: ParameterKind,
    pub description: Option<String>,
    /// Initial value; validated and normalised at registration time.
    pub default: Option<Value>,
    /// Permitted values, in canonical case. Text, number and sequence only.
    pub allowed_values: Option<Vec<Value>>,
    /// Mutual-exclusion group this parameter belongs to.
    pub switch_group: Option<String>,
    #[serde(default)]
    pub switch_change_behavior: SwitchPolicy,
    /// Once explicitly set, the value is locked for the process lifetime.
    #[serde(default)]
    pub immutable: bool,
    #[serde(default)]
    pub required: bool,
    /// Value is written to and read from the settings store automatically.
    #[serde(default)]
    pub persisted: bool,
    /// Separator for text accumulation. Defaults to a single space.
    pub join_separator: Option<String>,
    #[serde(default)]
    pub dict_merge: DictMerge,
    #[serde(default)]
    pub dict_override: DictOverride,
    pub input_filter: Option<InputFilter>,
    pub prompt: Option<PromptPolicy>,
}

impl ParameterDefinition {
    /// A minimal definition of the given kind, for programmatic registration.
    #[must_use]
    pub fn new(name: &str, kind: ParameterKind) -> Self {
        Self {
            name: name.to_string(),
            bind_name: None,
            kind,
            description: None,
            default: None,
            allowed_values: None,
            switch_group: None,
            switch_change_behavior: SwitchPolicy::default(),
            immutable: false,
            required: false,
            persisted: false,
            join_separator: None,
            dict_merge: DictMerge::default(),
            dict_override: DictOverride::default(),
            input_filter: None,
            prompt: None,
        }
    }

    /// The key under which values are stored and persisted.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        self.bind_name.as_deref().unwrap_or(&self.name)
    }

    /// The separator used for text accumulation.
    #[must_use]
    pub fn separator(&self) -> &str {
        self.join_separator.as_deref().unwrap_or(" ")
    }

    /// Apply the declared input filter, if any, to one raw fragment.
    #[must_use]
    pub fn filter_input(&self, raw: &str) -> String {
        match self.input_filter {
            Some(filter) => filter.apply(raw),
            None => raw.to_string(),
        }
    }
}

impl Display for ParameterDefinition {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        // Always show the name
        write!(formatter, "`{}`", self.name)?;

        // Add description if present
        if let Some(desc) = &self.description {
            write!(formatter, " ({})", desc)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_defaults_to_name() {
        let definition = ParameterDefinition::new("region", ParameterKind::Text);
        assert_eq!(definition.storage_key(), "region");
    }

    #[test]
    fn test_storage_key_uses_bind_name() {
        let mut definition = ParameterDefinition::new("region", ParameterKind::Text);
        definition.bind_name = Some("aws_region".to_string());
        assert_eq!(definition.storage_key(), "aws_region");
    }

    #[test]
    fn test_separator_default_is_space() {
        let definition = ParameterDefinition::new("flags", ParameterKind::Text);
        assert_eq!(definition.separator(), " ");
    }

    #[test]
    fn test_display_with_description() {
        let mut definition = ParameterDefinition::new("region", ParameterKind::Text);
        definition.description = Some("Deployment region".to_string());
        assert_eq!(format!("{definition}"), "`region` (Deployment region)");
    }

    #[test]
    fn test_input_filter_apply() {
        assert_eq!(InputFilter::Trim.apply("  x  "), "x");
        assert_eq!(InputFilter::Lowercase.apply("ABC"), "abc");
        assert_eq!(InputFilter::Uppercase.apply("abc"), "ABC");
        assert!(!InputFilter::ExpandUser.apply("~/data").starts_with('~'));
    }

    #[test]
    fn test_definition_deserializes_from_yaml() {
        let yaml = r#"
name: environment
kind: text
default: "Staging"
allowed_values: ["Production", "Staging"]
switch_group: env
switch_change_behavior: unset
persisted: true
prompt:
  timing: on_start
  repeat: if_blank
"#;
        let definition: ParameterDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(definition.name, "environment");
        assert_eq!(definition.kind, ParameterKind::Text);
        assert_eq!(definition.switch_change_behavior, SwitchPolicy::Unset);
        assert!(definition.persisted);
        let prompt = definition.prompt.unwrap();
        assert_eq!(prompt.repeat, PromptRepeat::IfBlank);
        assert_eq!(prompt.retry_limit, 3);
    }
}
