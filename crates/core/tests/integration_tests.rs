//! Integration tests for switchyard-core
//!
//! These tests verify that the engine's pieces work together correctly by
//! driving complete workflows: schema loading, assignment, switch groups,
//! accumulation and persistence round-trips.

use indexmap::IndexMap;

use switchyard_core::definitions::{
    ParameterDefinition, ParameterKind, PromptPolicy, PromptRepeat,
};
use switchyard_core::error::Error;
use switchyard_core::file_handling::{load_definitions, SettingsStore, YamlSettingsStore};
use switchyard_core::prompt::{run_prompt_phase, PromptContext, PromptInput};
use switchyard_core::registry::Registry;
use switchyard_core::value::Value;

use std::io::Write;
use tempfile::NamedTempFile;

fn registry_from_yaml(yaml: &str) -> Registry {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{yaml}").unwrap();
    let path = temp_file.path().to_str().unwrap().to_string();

    let mut registry = Registry::new();
    for definition in load_definitions(&path).unwrap() {
        registry.register(definition).unwrap();
    }
    registry
}

#[test]
fn test_schema_driven_registration_and_resolution() {
    let mut registry = registry_from_yaml(
        r#"
- name: environment
  kind: text
  description: "Deployment environment"
  default: "Staging"
  allowed_values: ["Production", "Staging"]
- name: retries
  kind: number
  default: 3
- name: tags
  kind: sequence
- name: labels
  kind: mapping
"#,
    );

    assert_eq!(
        registry.get("environment").unwrap(),
        Some(Value::from("Staging"))
    );
    assert_eq!(registry.get("retries").unwrap(), Some(Value::Integer(3)));

    // Allowed-value canonicalisation on assignment
    registry.set("environment", Value::from("production")).unwrap();
    assert_eq!(
        registry.get("environment").unwrap(),
        Some(Value::from("Production"))
    );

    // Normalising twice yields the same result as normalising once
    registry.set("environment", Value::from("Production")).unwrap();
    assert_eq!(
        registry.get("environment").unwrap(),
        Some(Value::from("Production"))
    );
}

#[test]
fn test_join_accumulates_tags_in_order() {
    let mut registry = registry_from_yaml(
        r#"
- name: tags
  kind: sequence
"#,
    );

    registry.join_input("tags", &["urgent".to_string()]).unwrap();
    registry.join_input("tags", &["review".to_string()]).unwrap();

    assert_eq!(
        registry.get("tags").unwrap(),
        Some(Value::Sequence(vec![
            Value::from("urgent"),
            Value::from("review"),
        ]))
    );
}

#[test]
fn test_switch_group_unset_scenario() {
    let mut registry = registry_from_yaml(
        r#"
- name: mode-read
  kind: toggle
  switch_group: modes
  switch_change_behavior: unset
- name: mode-write
  kind: toggle
  switch_group: modes
  switch_change_behavior: unset
"#,
    );

    registry.set("mode-read", Value::Toggle(true)).unwrap();
    registry.set("mode-write", Value::Toggle(true)).unwrap();

    assert!(!registry.is_set("mode-read").unwrap());
    assert_eq!(registry.get("mode-read").unwrap(), None);
    assert_eq!(
        registry.get("mode-write").unwrap(),
        Some(Value::Toggle(true))
    );
}

#[test]
fn test_switch_group_reject_keeps_both_sides() {
    let mut registry = registry_from_yaml(
        r#"
- name: json-output
  kind: toggle
  switch_group: output
- name: quiet-output
  kind: toggle
  switch_group: output
"#,
    );

    registry.set("json-output", Value::Toggle(true)).unwrap();
    let result = registry.set("quiet-output", Value::Toggle(true));
    assert!(matches!(result, Err(Error::SwitchConflict { .. })));

    assert_eq!(
        registry.get("json-output").unwrap(),
        Some(Value::Toggle(true))
    );
    assert_eq!(registry.get("quiet-output").unwrap(), None);
}

#[test]
fn test_switch_group_reset_restores_defaults() {
    let mut registry = registry_from_yaml(
        r#"
- name: profile-fast
  kind: text
  default: "off"
  switch_group: profiles
  switch_change_behavior: reset
- name: profile-safe
  kind: text
  default: "off"
  switch_group: profiles
  switch_change_behavior: reset
"#,
    );

    registry.set("profile-fast", Value::from("on")).unwrap();
    registry.set("profile-safe", Value::from("on")).unwrap();

    assert_eq!(
        registry.get("profile-fast").unwrap(),
        Some(Value::from("off"))
    );
    assert!(!registry.is_set("profile-fast").unwrap());
    assert_eq!(
        registry.get("profile-safe").unwrap(),
        Some(Value::from("on"))
    );
}

#[test]
fn test_immutable_parameter_survives_all_mutation_attempts() {
    let mut registry = registry_from_yaml(
        r#"
- name: api-token
  kind: text
  immutable: true
"#,
    );

    registry.set("api-token", Value::from("secret")).unwrap();

    assert!(matches!(
        registry.set("api-token", Value::from("other")),
        Err(Error::ImmutableParameter(_))
    ));
    assert!(matches!(
        registry.join("api-token", Value::from("more")),
        Err(Error::ImmutableParameter(_))
    ));
    assert!(matches!(
        registry.unset("api-token"),
        Err(Error::ImmutableParameter(_))
    ));
    assert!(matches!(
        registry.reset("api-token"),
        Err(Error::ImmutableParameter(_))
    ));

    assert_eq!(
        registry.get("api-token").unwrap(),
        Some(Value::from("secret"))
    );
}

#[test]
fn test_persisted_round_trip_with_canonicalisation() {
    let temp_file = NamedTempFile::new().unwrap();
    let settings_path = temp_file.path().to_str().unwrap().to_string();

    let schema = r#"
- name: environment
  kind: text
  allowed_values: ["Production", "Staging"]
  persisted: true
- name: retries
  kind: number
  persisted: true
- name: scratch
  kind: text
"#;

    {
        let mut temp_schema = NamedTempFile::new().unwrap();
        write!(temp_schema, "{schema}").unwrap();
        let schema_path = temp_schema.path().to_str().unwrap().to_string();

        let mut registry = Registry::new()
            .with_store(Box::new(YamlSettingsStore::new(settings_path.clone())));
        for definition in load_definitions(&schema_path).unwrap() {
            registry.register(definition).unwrap();
        }
        registry.load_persisted().unwrap();

        registry.set("environment", Value::from("staging")).unwrap();
        registry.set("retries", Value::Integer(5)).unwrap();
        // Not persisted; must not appear in the store
        registry.set("scratch", Value::from("temp")).unwrap();
    }

    // The store holds only persisted, explicitly set values
    let store = YamlSettingsStore::new(settings_path.clone());
    let saved = store.load().unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved["environment"], Value::from("Staging"));
    assert_eq!(saved["retries"], Value::Integer(5));

    // A fresh registry loads the same values back
    {
        let mut temp_schema = NamedTempFile::new().unwrap();
        write!(temp_schema, "{schema}").unwrap();
        let schema_path = temp_schema.path().to_str().unwrap().to_string();

        let mut registry = Registry::new()
            .with_store(Box::new(YamlSettingsStore::new(settings_path.clone())));
        for definition in load_definitions(&schema_path).unwrap() {
            registry.register(definition).unwrap();
        }
        registry.load_persisted().unwrap();

        assert_eq!(
            registry.get("environment").unwrap(),
            Some(Value::from("Staging"))
        );
        assert_eq!(registry.get("retries").unwrap(), Some(Value::Integer(5)));
        assert!(registry.is_set("environment").unwrap());
        assert_eq!(registry.get("scratch").unwrap(), None);
    }
}

#[test]
fn test_unset_of_persisted_parameter_clears_the_store() {
    let temp_file = NamedTempFile::new().unwrap();
    let settings_path = temp_file.path().to_str().unwrap().to_string();

    let mut definition = ParameterDefinition::new("environment", ParameterKind::Text);
    definition.persisted = true;

    let mut registry =
        Registry::new().with_store(Box::new(YamlSettingsStore::new(settings_path.clone())));
    registry.register(definition).unwrap();

    registry.set("environment", Value::from("prod")).unwrap();
    registry.unset("environment").unwrap();

    let store = YamlSettingsStore::new(settings_path);
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn test_batch_guard_restores_policy_on_early_return() {
    let mut registry = registry_from_yaml(
        r#"
- name: mode-read
  kind: toggle
  switch_group: modes
  switch_change_behavior: unset
- name: mode-write
  kind: toggle
  switch_group: modes
  switch_change_behavior: unset
"#,
    );

    registry.set("mode-read", Value::Toggle(true)).unwrap();

    // A parse pass that fails halfway through still releases batch mode
    let parse_result: Result<(), Error> = (|| {
        let mut guard = registry.batch_guard();
        guard.set("mode-write", Value::Toggle(true))?;
        unreachable!("the conflicting set above must fail");
    })();
    assert!(matches!(parse_result, Err(Error::SwitchConflict { .. })));
    assert!(!registry.in_batch_mode());

    // Configured policy applies again after the guard is gone
    registry.set("mode-write", Value::Toggle(true)).unwrap();
    assert!(!registry.is_set("mode-read").unwrap());
}

struct SingleAnswer {
    answer: String,
    asked: usize,
}

impl PromptInput for SingleAnswer {
    fn solicit(
        &mut self,
        _prompt_text: &str,
        _hide_echo: bool,
        _choices: Option<&[Value]>,
    ) -> switchyard_core::error::Result<String> {
        self.asked += 1;
        Ok(self.answer.clone())
    }
}

#[test]
fn test_prompt_solicits_once_across_three_iterations() {
    let mut registry = Registry::new();
    let mut definition = ParameterDefinition::new("environment", ParameterKind::Text);
    definition.prompt = Some(PromptPolicy {
        repeat: PromptRepeat::Never,
        ..PromptPolicy::default()
    });
    registry.register(definition).unwrap();

    let mut input = SingleAnswer {
        answer: "dev".to_string(),
        asked: 0,
    };

    for _ in 0..3 {
        run_prompt_phase(&mut registry, &PromptContext::AtStart, &mut input).unwrap();
    }

    assert_eq!(input.asked, 1);
    assert_eq!(
        registry.get("environment").unwrap(),
        Some(Value::from("dev"))
    );
}

#[test]
fn test_get_with_fallback_and_unknown_parameter() {
    let mut registry = Registry::new();
    registry
        .register(ParameterDefinition::new("region", ParameterKind::Text))
        .unwrap();

    assert_eq!(
        registry.get_or("region", Value::from("local")).unwrap(),
        Value::from("local")
    );
    assert!(matches!(
        registry.get("unknown"),
        Err(Error::UnknownParameter(_))
    ));
}

#[test]
fn test_mapping_accumulation_from_json_fragments() {
    let mut registry = registry_from_yaml(
        r#"
- name: labels
  kind: mapping
  dict_merge: deep
- name: annotations
  kind: mapping
  dict_override: first_wins
"#,
    );

    registry
        .set_input(
            "labels",
            &[
                r#"{"team": "infra", "meta": {"tier": 1}}"#.to_string(),
                r#"{"meta": {"owner": "ops"}}"#.to_string(),
            ],
        )
        .unwrap();

    let mut expected_meta = IndexMap::new();
    expected_meta.insert("tier".to_string(), Value::Integer(1));
    expected_meta.insert("owner".to_string(), Value::from("ops"));
    let mut expected = IndexMap::new();
    expected.insert("team".to_string(), Value::from("infra"));
    expected.insert("meta".to_string(), Value::Mapping(expected_meta));
    assert_eq!(
        registry.get("labels").unwrap(),
        Some(Value::Mapping(expected))
    );

    // FirstWins keeps the earlier fragment's value on collision
    registry
        .set_input(
            "annotations",
            &[r#"{"k": "first"}"#.to_string(), r#"{"k": "second"}"#.to_string()],
        )
        .unwrap();
    let Some(Value::Mapping(entries)) = registry.get("annotations").unwrap() else {
        panic!("expected a mapping");
    };
    assert_eq!(entries["k"], Value::from("first"));
}

#[test]
fn test_switch_policies_forced_to_reject_in_batch_mode() {
    let mut registry = registry_from_yaml(
        r#"
- name: mode-read
  kind: toggle
  switch_group: modes
  switch_change_behavior: unset
- name: mode-write
  kind: toggle
  switch_group: modes
  switch_change_behavior: unset
"#,
    );

    let mut guard = registry.batch_guard();
    guard.set("mode-read", Value::Toggle(true)).unwrap();
    let result = guard.set("mode-write", Value::Toggle(true));
    assert!(matches!(result, Err(Error::SwitchConflict { .. })));
}
