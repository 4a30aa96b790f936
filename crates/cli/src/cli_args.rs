//! Command-line argument parsing and validation.
//!
//! This module defines the command-line interface structure for the `sy`
//! binary using the `clap` crate.

use clap::{Parser, Subcommand};

/// Command-line arguments for the switchyard CLI tool.
///
/// Assignments given with `-p` are applied in batch mode before the verb
/// runs, so switch groups always reject conflicts between command-line
/// tokens instead of silently unsetting each other.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use switchyard_cli::cli_args::Args;
///
/// // Parse arguments from command line
/// let args = Args::parse();
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(term_width = 0)] // Just to make testing across clap features easier
pub struct Args {
    /// Path to the parameter schema YAML.
    ///
    /// If not provided, defaults to `~/.switchyard/parameters.yml`.
    #[arg(long, short = 'c')]
    pub schema_path: Option<String>,

    /// Path to the persisted settings store.
    ///
    /// If not provided, defaults to `~/.switchyard/settings.yml`.
    #[arg(long, short = 's')]
    pub settings_path: Option<String>,

    /// Skip the interactive prompting phase.
    ///
    /// Parameters with prompt policies keep whatever value they already
    /// have; required parameters without a value still fail.
    #[arg(long, short = 'n', action)]
    pub no_prompt: bool,

    /// Parameter assignments in the format name=value.
    ///
    /// Multiple assignments can be provided with repeated `-p` flags.
    /// Repeating the same name supplies several fragments to one
    /// assignment, which are merged left to right. A bare `-p name` flips
    /// a toggle parameter's default.
    ///
    /// # Examples
    /// ```bash
    /// sy -p environment=prod -p region=us-west-2 list
    /// ```
    #[arg(long = "param", short = 'p', action = clap::ArgAction::Append)]
    pub parameters: Vec<String>,

    #[command(subcommand)]
    pub verb: Option<Verb>,
}

/// The operation to perform once assignment and prompting are done.
#[derive(Subcommand, Debug)]
pub enum Verb {
    /// Show every registered parameter and its current value (the default).
    List,

    /// Print the resolved value of one parameter.
    Get { name: String },

    /// Replace a parameter's value. Several values become fragments of one
    /// assignment, merged left to right.
    Set {
        name: String,
        #[arg(required = true, num_args(1..))]
        values: Vec<String>,
    },

    /// Accumulate onto a parameter's current value.
    Join {
        name: String,
        #[arg(required = true, num_args(1..))]
        values: Vec<String>,
    },

    /// Remove a parameter's stored value entirely.
    Unset { name: String },

    /// Restore a parameter's declared default.
    Reset { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_args_default_values() {
        let args = Args::parse_from(["sy"]);

        assert!(args.schema_path.is_none());
        assert!(args.settings_path.is_none());
        assert!(!args.no_prompt);
        assert!(args.parameters.is_empty());
        assert!(args.verb.is_none());
    }

    #[test]
    fn test_args_short_flags() {
        let args = Args::parse_from([
            "sy",
            "-c",
            "/custom/parameters.yml",
            "-s",
            "/custom/settings.yml",
            "-n",
        ]);

        assert_eq!(args.schema_path, Some("/custom/parameters.yml".to_string()));
        assert_eq!(args.settings_path, Some("/custom/settings.yml".to_string()));
        assert!(args.no_prompt);
    }

    #[test]
    fn test_args_long_flags() {
        let args = Args::parse_from([
            "sy",
            "--schema-path",
            "/custom/parameters.yml",
            "--settings-path",
            "/custom/settings.yml",
            "--no-prompt",
        ]);

        assert_eq!(args.schema_path, Some("/custom/parameters.yml".to_string()));
        assert_eq!(args.settings_path, Some("/custom/settings.yml".to_string()));
        assert!(args.no_prompt);
    }

    #[test]
    fn test_args_repeated_parameters() {
        let args = Args::parse_from([
            "sy",
            "-p",
            "env=prod",
            "--param",
            "region=us-west-2",
            "list",
        ]);

        assert_eq!(args.parameters.len(), 2);
        assert_eq!(args.parameters[0], "env=prod");
        assert_eq!(args.parameters[1], "region=us-west-2");
        assert!(matches!(args.verb, Some(Verb::List)));
    }

    #[test]
    fn test_args_get_verb() {
        let args = Args::parse_from(["sy", "get", "environment"]);
        match args.verb {
            Some(Verb::Get { name }) => assert_eq!(name, "environment"),
            other => panic!("expected Get verb, got {other:?}"),
        }
    }

    #[test]
    fn test_args_set_verb_with_multiple_values() {
        let args = Args::parse_from(["sy", "set", "labels", r#"{"a": 1}"#, r#"{"b": 2}"#]);
        match args.verb {
            Some(Verb::Set { name, values }) => {
                assert_eq!(name, "labels");
                assert_eq!(values.len(), 2);
            }
            other => panic!("expected Set verb, got {other:?}"),
        }
    }

    #[test]
    fn test_args_set_verb_requires_a_value() {
        let result = Args::try_parse_from(["sy", "set", "labels"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_args_join_unset_reset_verbs() {
        let args = Args::parse_from(["sy", "join", "tags", "urgent"]);
        assert!(matches!(args.verb, Some(Verb::Join { .. })));

        let args = Args::parse_from(["sy", "unset", "tags"]);
        assert!(matches!(args.verb, Some(Verb::Unset { .. })));

        let args = Args::parse_from(["sy", "reset", "tags"]);
        assert!(matches!(args.verb, Some(Verb::Reset { .. })));
    }
}
