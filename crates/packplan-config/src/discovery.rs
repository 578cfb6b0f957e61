//! File-based config discovery
//!
//! Finds `packplan.toml` in a project root and layers `PACKPLAN_` environment
//! variables over it.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format as _, Toml},
    Figment,
};
use tracing::debug;

use crate::config::PlanConfig;
use crate::environment::Environment;
use crate::error::{ConfigError, Result};
use crate::plan::BuildPlan;

pub const CONFIG_FILE: &str = "packplan.toml";

/// Prefix for environment overrides. Nested keys are separated by `__` and
/// each segment is read as snake_case, so `PACKPLAN_SETTINGS__LOG_LEVEL`
/// sets `settings.logLevel` and `PACKPLAN_PRODUCTION__OUTPUT__PUBLIC_PATH`
/// sets `production.output.publicPath`.
///
/// Map keys chosen by the user (entry and cache group names) go through the
/// same conversion, so `blog_page` becomes `blogPage`.
pub const ENV_PREFIX: &str = "PACKPLAN_";

/// File-based configuration discovery
///
/// Library users that already hold a configuration value should use
/// [`PlanConfig::from_value`] directly.
///
/// # Example
///
/// ```no_run
/// use packplan_config::{ConfigDiscovery, Environment};
///
/// let discovery = ConfigDiscovery::new(".");
/// let plan = discovery.resolve(Environment::Production).unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Path of the config file, if the root has one.
    pub fn find(&self) -> Option<PathBuf> {
        let path = self.root.join(CONFIG_FILE);
        path.is_file().then_some(path)
    }

    /// Load config from the discovered file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the root has no config file.
    pub fn load(&self) -> Result<PlanConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        self.load_from(&path)
    }

    /// Like [`load`](Self::load), but falls back to the built-in presets
    /// (still subject to environment overrides) when there is no file.
    pub fn load_or_builtin(&self) -> Result<PlanConfig> {
        match self.find() {
            Some(path) => self.load_from(&path),
            None => {
                debug!(root = %self.root.display(), "no {CONFIG_FILE}, using built-in profiles");
                extract(layered(None))
            }
        }
    }

    /// Load config from a specific file path
    pub fn load_from(&self, path: &Path) -> Result<PlanConfig> {
        if !path.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )
            .into());
        }
        debug!(path = %path.display(), "loading config");
        extract(layered(Some(path)))
    }

    /// Load (or fall back to presets) and resolve the plan for `env`.
    pub fn resolve(&self, env: Environment) -> Result<BuildPlan> {
        self.load_or_builtin()?.resolve(env)
    }
}

fn layered(path: Option<&Path>) -> Figment {
    let mut figment = Figment::new();
    if let Some(path) = path {
        figment = figment.merge(Toml::file(path));
    }
    let env = Env::prefixed(ENV_PREFIX)
        .split("__")
        .map(|key| env_key_to_field(key.as_str()).into())
        .lowercase(false);
    figment.merge(env)
}

/// `SETTINGS.LOG_LEVEL` -> `settings.logLevel`
fn env_key_to_field(key: &str) -> String {
    key.split('.')
        .map(|segment| {
            let mut field = String::with_capacity(segment.len());
            let mut upper_next = false;
            for c in segment.chars() {
                if c == '_' && !field.is_empty() {
                    upper_next = true;
                } else if upper_next {
                    field.push(c.to_ascii_uppercase());
                    upper_next = false;
                } else {
                    field.push(c.to_ascii_lowercase());
                }
            }
            field
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn extract(figment: Figment) -> Result<PlanConfig> {
    let config: PlanConfig = figment.extract()?;
    config.finish()
}

/// Discover config in the current directory and resolve the plan for `env`
///
/// # Example
///
/// ```no_run
/// use packplan_config::{discover, Environment};
///
/// let plan = discover(Environment::Development).unwrap();
/// ```
pub fn discover(env: Environment) -> Result<BuildPlan> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).resolve(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_config() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn find_ignores_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(CONFIG_FILE)).unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn load_returns_not_found_when_no_config() {
        let dir = TempDir::new().unwrap();
        let result = ConfigDiscovery::new(dir.path()).load();
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound));
    }

    #[test]
    fn load_from_missing_path_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = ConfigDiscovery::new(dir.path()).load_from(&dir.path().join("nope.toml"));
        assert!(matches!(result.unwrap_err(), ConfigError::Io(_)));
    }

    #[test]
    fn env_keys_map_to_camel_case_fields() {
        assert_eq!(env_key_to_field("SETTINGS.LOG_LEVEL"), "settings.logLevel");
        assert_eq!(
            env_key_to_field("PRODUCTION.OUTPUT.PUBLIC_PATH"),
            "production.output.publicPath"
        );
        assert_eq!(
            env_key_to_field("BASE.OPTIMIZATION.RUNTIME_CHUNK"),
            "base.optimization.runtimeChunk"
        );
        assert_eq!(env_key_to_field("DEVELOPMENT.CONTEXT"), "development.context");
    }

    #[test]
    fn load_names_declared_profiles() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
[development.output]
filename = "[name].js"
"#,
        )
        .unwrap();

        let config = ConfigDiscovery::new(dir.path()).load().unwrap();
        assert_eq!(config.development.unwrap().name, "development");
        assert!(config.base.is_none());
        assert!(config.production.is_none());
    }
}
