//! File handling for the parameter schema and the settings store.
//!
//! This module reads and validates parameter definitions from a YAML schema
//! file, and provides the settings-store collaborator used for `persisted`
//! parameters.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use indexmap::IndexMap;

use crate::definitions::ParameterDefinition;
use crate::error::Error::{
    DuplicateName, EmptyName, NameWithColon, NameWithSpace, NumericName,
};
use crate::error::{Error, Result};
use crate::value::Value;

fn get_reader(file_description: &str, path: &str) -> Result<File> {
    match File::open(path) {
        Ok(reader) => Ok(reader),
        Err(e) => Err(Error::io_error(
            file_description.to_string(),
            path.to_string(),
            e,
        )),
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(EmptyName);
    }

    if name.contains(' ') {
        return Err(NameWithSpace(name.to_string()));
    }

    if name.contains(':') {
        return Err(NameWithColon(name.to_string()));
    }

    if name.chars().all(|c| c.is_numeric()) {
        return Err(NumericName(name.to_string()));
    }

    Ok(())
}

fn validate_definition_names(definitions: &[ParameterDefinition]) -> Result<()> {
    let mut names = HashSet::new();
    let mut keys = HashSet::new();

    for definition in definitions {
        validate_name(&definition.name)?;
        if let Some(bind_name) = &definition.bind_name {
            validate_name(bind_name)?;
        }

        if !names.insert(definition.name.clone()) {
            return Err(DuplicateName(definition.name.clone()));
        }

        if !keys.insert(definition.storage_key().to_string()) {
            // A storage key collision is as fatal as a name collision
            return Err(DuplicateName(definition.name.clone()));
        }
    }

    Ok(())
}

/// Loads and validates parameter definitions from a schema file.
///
/// Reads the YAML schema, parses the definitions, and validates that every
/// name and bind name is unique and properly formatted. Type and
/// allowed-value validation of defaults happens later, at registration.
///
/// # Errors
///
/// Returns an error if:
/// - The schema file cannot be read
/// - The YAML is malformed or doesn't match the expected structure
/// - The schema file is empty
/// - Parameter names are invalid or non-unique
pub fn load_definitions(schema_path: &String) -> Result<Vec<ParameterDefinition>> {
    let schema_reader = get_reader("schema", schema_path)?;

    let parsing_result: serde_yaml::Result<Vec<ParameterDefinition>> =
        serde_yaml::from_reader(schema_reader);

    let definitions = parsing_result.map_err(|e| {
        Error::yaml_error(
            "reading".to_string(),
            "schema".to_string(),
            schema_path.clone(),
            e,
        )
    })?;

    if definitions.is_empty() {
        return Err(Error::EmptyDefinitions {
            path: schema_path.to_string(),
        });
    }

    validate_definition_names(&definitions)?;

    Ok(definitions)
}

/// The persistence collaborator: a flat mapping of storage key to value.
pub trait SettingsStore {
    /// Read the persisted mapping. A store with no saved state yet returns
    /// an empty mapping, not an error.
    fn load(&self) -> Result<IndexMap<String, Value>>;

    /// Write the full persisted mapping, replacing previous contents.
    fn save(&self, values: &IndexMap<String, Value>) -> Result<()>;
}

/// Settings store backed by a YAML file.
pub struct YamlSettingsStore {
    path: String,
}

impl YamlSettingsStore {
    #[must_use]
    pub fn new(path: String) -> Self {
        Self { path }
    }
}

impl SettingsStore for YamlSettingsStore {
    fn load(&self) -> Result<IndexMap<String, Value>> {
        if !Path::exists(Path::new(&self.path)) {
            return Ok(IndexMap::new());
        }

        let reader = get_reader("settings", &self.path)?;
        let parsed: serde_yaml::Result<IndexMap<String, Value>> = serde_yaml::from_reader(reader);

        match parsed {
            Ok(values) => Ok(values),
            Err(e) => Err(Error::yaml_error(
                "reading".to_string(),
                "settings".to_string(),
                self.path.clone(),
                e,
            )),
        }
    }

    fn save(&self, values: &IndexMap<String, Value>) -> Result<()> {
        let f = File::create(&self.path);

        let Ok(f) = f else {
            return Err(Error::io_error(
                "settings".to_string(),
                self.path.clone(),
                f.unwrap_err(),
            ));
        };

        serde_yaml::to_writer(f, values).map_err(|e| {
            Error::yaml_error(
                "writing".to_string(),
                "settings".to_string(),
                self.path.clone(),
                e,
            )
        })
    }
}
