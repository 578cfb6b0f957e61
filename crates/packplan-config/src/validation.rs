//! Pluggable profile validation strategies
//!
//! Separates schema validation (pure, used on every construction and merge)
//! from filesystem validation (checks that referenced files exist).

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::profile::{Plugin, PluginKind, Profile};

/// Trait for pluggable profile validation strategies
pub trait ConfigValidator {
    fn validate(&self, profile: &Profile) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// # Example
///
/// ```
/// use packplan_config::{ConfigValidator, Profile, SchemaValidator};
///
/// let mut profile = Profile::default();
/// profile.entry.insert("index".into(), "./src/index.js".into());
///
/// SchemaValidator.validate(&profile).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, profile: &Profile) -> Result<()> {
        validate_named(profile, &profile.name)
    }
}

/// Schema validation reporting errors against `name` instead of the
/// profile's own (possibly empty) name.
pub(crate) fn validate_named(profile: &Profile, name: &str) -> Result<()> {
    for (entry, path) in &profile.entry {
        if !is_identifier(entry) {
            return Err(ConfigError::SchemaValidation {
                message: format!("entry name `{entry}` in profile '{name}' is not valid"),
                hint: Some("Entry names must be non-empty and contain no whitespace".into()),
            });
        }
        if path.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value(
                format!("entry.{entry}"),
                "entry path cannot be empty",
            ));
        }
    }

    for (index, rule) in profile.rules.iter().enumerate() {
        rule.validate(name, index)?;

        // Two rules for one pattern in the same profile is a duplicate,
        // not an override
        if let Some(first) = profile.rules[..index]
            .iter()
            .position(|earlier| earlier.test == rule.test)
        {
            return Err(ConfigError::conflict(
                name,
                format!("rules[{index}].test"),
                format!("pattern {} duplicates rules[{first}]", rule.test),
            ));
        }
    }

    for (index, plugin) in profile.plugins.iter().enumerate() {
        let field = format!("plugins[{index}]");
        check_plugin(plugin, &field)?;
        if plugin.kind() == PluginKind::Minimizer {
            return Err(ConfigError::SchemaValidation {
                message: format!(
                    "{field} in profile '{name}' is the minimizer `{}`",
                    plugin.identifier()
                ),
                hint: Some("Move minimizers to optimization.minimizer".into()),
            });
        }
    }

    for (index, plugin) in profile.optimization.minimizer.iter().enumerate() {
        let field = format!("optimization.minimizer[{index}]");
        check_plugin(plugin, &field)?;
        if plugin.kind() == PluginKind::Build {
            return Err(ConfigError::SchemaValidation {
                message: format!(
                    "{field} in profile '{name}' is not a minimizer (`{}`)",
                    plugin.identifier()
                ),
                hint: Some("Move build plugins to plugins".into()),
            });
        }
    }

    for (group_name, group) in &profile.optimization.split_chunks.cache_groups {
        let field = format!("optimization.splitChunks.cacheGroups.{group_name}");
        if !is_identifier(group_name) {
            return Err(ConfigError::invalid_value(
                field,
                "cache group keys must be non-empty and contain no whitespace",
            ));
        }
        group.test.check(name, format!("{field}.test"))?;
        if group.name.as_deref().is_some_and(|unit| unit.trim().is_empty()) {
            return Err(ConfigError::invalid_value(
                format!("{field}.name"),
                "omit the name to suppress naming instead of leaving it empty",
            ));
        }
    }

    Ok(())
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(char::is_whitespace)
}

fn check_plugin(plugin: &Plugin, field: &str) -> Result<()> {
    match plugin {
        Plugin::External { plugin: id, .. } if !is_identifier(id) => Err(
            ConfigError::invalid_value(field, format!("`{id}` is not a well-formed plugin identifier")),
        ),
        Plugin::Manifest(opts) if opts.file_name.trim().is_empty() => Err(
            ConfigError::invalid_value(format!("{field}.options.fileName"), "cannot be empty"),
        ),
        Plugin::Html(opts) => {
            if opts.filename.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    format!("{field}.options.filename"),
                    "cannot be empty",
                ));
            }
            for chunk in opts.chunks.iter().flatten() {
                if !is_identifier(chunk) {
                    return Err(ConfigError::invalid_value(
                        format!("{field}.options.chunks"),
                        format!("`{chunk}` is not a valid output unit name"),
                    ));
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Filesystem validator
///
/// Checks that entry modules and HTML templates exist under a project root.
/// Paths are resolved against the profile's `context` when one is set.
///
/// # Example
///
/// ```no_run
/// use packplan_config::{ConfigValidator, FsValidator, Profile};
///
/// let profile = Profile::builder("base")
///     .entry("index", "./src/index.js")
///     .build()
///     .unwrap();
///
/// FsValidator::new(".").validate(&profile).unwrap();
/// ```
pub struct FsValidator {
    root: PathBuf,
}

impl FsValidator {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn base_dir(&self, profile: &Profile) -> PathBuf {
        match &profile.context {
            Some(context) => self.root.join(context),
            None => self.root.clone(),
        }
    }
}

impl ConfigValidator for FsValidator {
    fn validate(&self, profile: &Profile) -> Result<()> {
        // First run schema validation
        SchemaValidator.validate(profile)?;

        let base = self.base_dir(profile);

        for path in profile.entry.values() {
            let path = base.join(path);
            if !path.exists() {
                return Err(ConfigError::EntryNotFound { path });
            }
        }

        for plugin in &profile.plugins {
            if let Plugin::Html(opts) = plugin {
                if let Some(template) = &opts.template {
                    let path = base.join(template);
                    if !path.exists() {
                        return Err(ConfigError::TemplateNotFound { path });
                    }
                }
            }
        }

        Ok(())
    }
}

/// Convenience function for schema-only validation
pub fn validate_schema(profile: &Profile) -> Result<()> {
    SchemaValidator.validate(profile)
}

/// Convenience function for filesystem validation
pub fn validate_fs(profile: &Profile, root: impl AsRef<Path>) -> Result<()> {
    FsValidator::new(root).validate(profile)
}
