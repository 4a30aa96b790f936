use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::definitions::ParameterKind;

/// A typed parameter value.
///
/// Serialisation is untagged, so values round-trip through YAML and JSON as
/// the plain scalars and structures a settings file would naturally contain.
/// Mappings keep insertion order.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Toggle(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

impl Value {
    /// The kind this value satisfies. Integers and floats both count as
    /// numbers.
    #[must_use]
    pub fn kind(&self) -> ParameterKind {
        match self {
            Value::Toggle(_) => ParameterKind::Toggle,
            Value::Integer(_) | Value::Float(_) => ParameterKind::Number,
            Value::Text(_) => ParameterKind::Text,
            Value::Sequence(_) => ParameterKind::Sequence,
            Value::Mapping(_) => ParameterKind::Mapping,
        }
    }

    /// False, zero and empty values are falsy; everything else is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Toggle(toggled) => *toggled,
            Value::Integer(number) => *number != 0,
            Value::Float(number) => *number != 0.0,
            Value::Text(text) => !text.is_empty(),
            Value::Sequence(elements) => !elements.is_empty(),
            Value::Mapping(entries) => !entries.is_empty(),
        }
    }

    /// Whether the value is blank for prompting purposes: empty or
    /// whitespace-only text, or an empty container. Toggles and numbers are
    /// never blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Text(text) => text.trim().is_empty(),
            Value::Sequence(elements) => elements.is_empty(),
            Value::Mapping(entries) => entries.is_empty(),
            Value::Toggle(_) | Value::Integer(_) | Value::Float(_) => false,
        }
    }

    /// Numeric view of the value, if it is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(number) => Some(*number as f64),
            Value::Float(number) => Some(*number),
            _ => None,
        }
    }

    /// Text view of a scalar value. Containers have no text form.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Text(text) => Some(text.clone()),
            Value::Toggle(toggled) => Some(toggled.to_string()),
            Value::Integer(number) => Some(number.to_string()),
            Value::Float(number) => Some(number.to_string()),
            Value::Sequence(_) | Value::Mapping(_) => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Toggle(toggled) => write!(formatter, "{toggled}"),
            Value::Integer(number) => write!(formatter, "{number}"),
            Value::Float(number) => write!(formatter, "{number}"),
            Value::Text(text) => formatter.write_str(text),
            // Containers render as compact JSON
            Value::Sequence(_) | Value::Mapping(_) => match serde_json::to_string(self) {
                Ok(rendered) => formatter.write_str(&rendered),
                Err(_) => write!(formatter, "{self:?}"),
            },
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<bool> for Value {
    fn from(toggled: bool) -> Self {
        Value::Toggle(toggled)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Integer(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_values() {
        assert_eq!(Value::Toggle(true).kind(), ParameterKind::Toggle);
        assert_eq!(Value::Integer(3).kind(), ParameterKind::Number);
        assert_eq!(Value::Float(3.5).kind(), ParameterKind::Number);
        assert_eq!(Value::from("x").kind(), ParameterKind::Text);
        assert_eq!(Value::Sequence(vec![]).kind(), ParameterKind::Sequence);
        assert_eq!(Value::Mapping(IndexMap::new()).kind(), ParameterKind::Mapping);
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Toggle(true).is_truthy());
        assert!(!Value::Toggle(false).is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(Value::Integer(-1).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(!Value::Sequence(vec![]).is_truthy());
    }

    #[test]
    fn test_blankness() {
        assert!(Value::from("   ").is_blank());
        assert!(!Value::from("x").is_blank());
        assert!(Value::Sequence(vec![]).is_blank());
        assert!(!Value::Toggle(false).is_blank());
        assert!(!Value::Integer(0).is_blank());
    }

    #[test]
    fn test_untagged_yaml_round_trip() {
        let yaml = "count: 3\nratio: 0.5\nname: web\nverbose: true\ntags:\n- a\n- b\n";
        let parsed: IndexMap<String, Value> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed["count"], Value::Integer(3));
        assert_eq!(parsed["ratio"], Value::Float(0.5));
        assert_eq!(parsed["name"], Value::from("web"));
        assert_eq!(parsed["verbose"], Value::Toggle(true));
        assert_eq!(
            parsed["tags"],
            Value::Sequence(vec![Value::from("a"), Value::from("b")])
        );

        let rendered = serde_yaml::to_string(&parsed).unwrap();
        let reparsed: IndexMap<String, Value> = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(parsed, reparsed);
    }

    #[test]
    fn test_display_of_containers_is_compact_json() {
        let mut entries = IndexMap::new();
        entries.insert("a".to_string(), Value::Integer(1));
        assert_eq!(format!("{}", Value::Mapping(entries)), r#"{"a":1}"#);
    }
}
