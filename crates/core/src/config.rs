//! Configuration path utilities for switchyard.
//!
//! This module provides functions for resolving the parameter schema and
//! settings file paths and expanding shell variables like `~` in paths.

/// Default path for the parameter schema file
const DEFAULT_SCHEMA_PATH: &str = "~/.switchyard/parameters.yml";
/// Default path for the persisted settings store
const DEFAULT_SETTINGS_PATH: &str = "~/.switchyard/settings.yml";

/// Resolves the parameter schema file path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// schema path. Shell expansions like `~` are resolved.
///
/// # Arguments
///
/// * `schema_path_arg` - Optional custom schema file path
///
/// # Returns
///
/// The resolved absolute path to the schema file
///
/// # Examples
///
/// ```
/// use switchyard_core::config::get_schema_path;
///
/// // Use default path
/// let default_path = get_schema_path(&None);
///
/// // Use custom path
/// let custom_path = get_schema_path(&Some("/path/to/parameters.yml".to_string()));
/// ```
pub fn get_schema_path(schema_path_arg: &Option<String>) -> String {
    let schema_path = match schema_path_arg {
        Some(schema_path) => schema_path,
        None => DEFAULT_SCHEMA_PATH,
    };

    shellexpand::tilde(schema_path).to_string()
}

/// Resolves the settings store path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// settings path. Shell expansions like `~` are resolved.
pub fn get_settings_path(settings_path_arg: &Option<String>) -> String {
    let settings_path = match settings_path_arg {
        Some(settings_path) => settings_path,
        None => DEFAULT_SETTINGS_PATH,
    };

    shellexpand::tilde(settings_path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_schema_path_with_custom_path() {
        let custom_path = Some("/custom/path/parameters.yml".to_string());
        let result = get_schema_path(&custom_path);
        assert_eq!(result, "/custom/path/parameters.yml");
    }

    #[test]
    fn test_get_schema_path_with_none() {
        let result = get_schema_path(&None);
        // Should expand the tilde in the default path
        assert!(result.contains("parameters.yml"));
        assert!(!result.starts_with('~'));
    }

    #[test]
    fn test_get_schema_path_with_tilde() {
        let tilde_path = Some("~/my-parameters.yml".to_string());
        let result = get_schema_path(&tilde_path);
        // Should expand the tilde
        assert!(!result.starts_with('~'));
        assert!(result.ends_with("my-parameters.yml"));
    }

    #[test]
    fn test_get_settings_path_with_custom_path() {
        let custom_path = Some("/custom/settings.yml".to_string());
        let result = get_settings_path(&custom_path);
        assert_eq!(result, "/custom/settings.yml");
    }

    #[test]
    fn test_get_settings_path_with_none() {
        let result = get_settings_path(&None);
        // Should expand the tilde in the default path
        assert!(result.contains("settings.yml"));
        assert!(!result.starts_with('~'));
    }
}
