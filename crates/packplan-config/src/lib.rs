//! Composes a base build profile with one environment profile into the
//! build plan a static-asset bundler consumes.

pub mod config;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod manifest;
pub mod merge;
pub mod pattern;
pub mod plan;
pub mod presets;
pub mod profile;
pub mod settings;
pub mod template;
pub mod validation;

#[cfg(feature = "logging")]
pub mod logging;

// Re-export main types
pub use config::*;
pub use environment::Environment;
pub use error::*;
pub use manifest::AssetManifest;
pub use merge::merge;
pub use pattern::Matcher;
pub use plan::BuildPlan;
pub use profile::*;
pub use settings::*;
pub use template::{content_hash, FilenameTemplate, RenderContext, Token, DEFAULT_HASH_LENGTH};

// Re-export discovery and validation
pub use discovery::{discover, ConfigDiscovery, CONFIG_FILE, ENV_PREFIX};
pub use validation::{validate_fs, validate_schema, ConfigValidator, FsValidator, SchemaValidator};
