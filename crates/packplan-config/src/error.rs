//! Error and warning types for profile validation, merging and loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Merge errors
    #[error("configuration conflict in profile '{profile}' at {field}: {message}")]
    ConfigurationConflict {
        profile: String,
        field: String,
        message: String,
    },

    #[error("malformed pattern `{pattern}` in profile '{profile}' at {field}: {source}")]
    MalformedPattern {
        profile: String,
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{field} was deferred by the base profile but profile '{profile}' does not supply it")]
    Unresolved { profile: String, field: String },

    #[error("invalid filename template `{template}`: {message}")]
    InvalidTemplate { template: String, message: String },

    // Schema validation errors (no filesystem checks)
    #[error("no entries specified")]
    NoEntries,

    #[error("invalid config value for {field}{}", .hint.as_deref().map(|h| format!(": {h}")).unwrap_or_default())]
    InvalidValue { field: String, hint: Option<String> },

    #[error("schema validation failed: {message}")]
    SchemaValidation {
        message: String,
        hint: Option<String>,
    },

    // Filesystem validation errors
    #[error("entry path not found: {}", .path.display())]
    EntryNotFound { path: PathBuf },

    #[error("html template not found: {}", .path.display())]
    TemplateNotFound { path: PathBuf },

    // Config loading errors
    #[error("config not found")]
    NotFound,

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn conflict(
        profile: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ConfigurationConflict {
            profile: profile.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_value(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            hint: Some(hint.into()),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// Non-fatal findings collected while resolving a plan.
///
/// Warnings never abort a merge. The external engine is the authority on
/// whether a referenced identifier actually exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigWarning {
    #[error("profile '{profile}' references `{identifier}` at {field}; it will be resolved by the bundler")]
    UnresolvedReference {
        profile: String,
        field: String,
        identifier: String,
    },

    #[error("html plugin injects unknown output unit `{unit}`")]
    UnknownOutputUnit { unit: String },
}
