use thiserror::Error;

use crate::definitions::ParameterKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No parameter named `{}` is registered.", _0)]
    UnknownParameter(String),

    #[error("A parameter named `{}` is already registered.", _0)]
    DuplicateName(String),

    #[error("Default for parameter `{}` is invalid: {}", .name, .reason)]
    InvalidDefault { name: String, reason: String },

    #[error("Cannot read `{}` as {} for parameter `{}`.", .raw, .expected, .name)]
    TypeConversion {
        name: String,
        expected: ParameterKind,
        raw: String,
    },

    #[error("Value `{}` is not allowed for `{}`. Permitted values: {}.", .value, .name, .allowed)]
    DisallowedValue {
        name: String,
        value: String,
        allowed: String,
    },

    #[error("Parameter `{}` is immutable and already holds a value.", _0)]
    ImmutableParameter(String),

    #[error("Parameter `{}` conflicts with `{}` in switch group `{}`.", .name, .conflicting, .group)]
    SwitchConflict {
        name: String,
        conflicting: String,
        group: String,
    },

    #[error("Parameter `{}` has kind {}, which does not support joining.", .name, .kind)]
    UnsupportedJoin { name: String, kind: ParameterKind },

    #[error("No valid value for `{}` after {} attempt(s).", .name, .attempts)]
    PromptValidationExhausted { name: String, attempts: u32 },

    #[error("Required parameter(s) have no value: {}", _0)]
    MissingRequiredParameters(String),

    #[error("Malformed parameter assignment `{}`: expected `name=value`.", _0)]
    ParameterFormat(String),

    #[error("No parameter definitions were found. Is `{}` empty?", .path)]
    EmptyDefinitions { path: String },

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("Malformed structured value for `{}`: {}", .name, .original)]
    Json {
        name: String,
        original: serde_json::Error,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("STDIO error: {}", _0)]
    Stdio(#[from] std::io::Error),

    #[error("Invalid name: name may not be empty")]
    EmptyName,

    #[error("Invalid name `{}`: name may not contain spaces", _0)]
    NameWithSpace(String),

    #[error("Invalid name `{}`: name may not contain a colon (reserved for future use)", _0)]
    NameWithColon(String),

    #[error("Invalid name `{}`: name cannot be purely numeric", _0)]
    NumericName(String),
}

impl Error {
    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    /// Whether this error should trigger another solicitation attempt rather
    /// than abort the prompt loop. Only input-shaped failures are retried.
    #[must_use]
    pub fn is_retryable_input(&self) -> bool {
        matches!(
            self,
            Error::TypeConversion { .. } | Error::DisallowedValue { .. } | Error::Json { .. }
        )
    }
}
