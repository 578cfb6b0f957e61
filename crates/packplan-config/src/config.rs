//! Top-level configuration: a base profile, one profile per environment and
//! invocation settings.
//!
//! For file discovery, see the `discovery` module.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::environment::Environment;
use crate::error::{ConfigError, Result};
use crate::merge::merge;
use crate::plan::BuildPlan;
use crate::presets;
use crate::profile::Profile;
use crate::settings::Settings;
use crate::validation::{ConfigValidator, SchemaValidator};

/// Profile definitions for every environment.
///
/// Profiles that are not declared fall back to the built-in presets. A
/// declared profile replaces its preset as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Profile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development: Option<Profile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<Profile>,

    #[serde(default)]
    pub settings: Settings,
}

impl PlanConfig {
    /// Configuration made entirely of the built-in presets.
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            base: Some(presets::base_profile()?),
            development: Some(presets::development_profile()?),
            production: Some(presets::production_profile()?),
            settings: Settings::default(),
        })
    }

    /// Create from serde_json::Value (for programmatic config)
    ///
    /// # Example
    ///
    /// ```
    /// use packplan_config::{Environment, PlanConfig};
    /// use serde_json::json;
    ///
    /// let config = PlanConfig::from_value(json!({
    ///     "production": {
    ///         "output": { "filename": "[name].[contenthash:8].js" }
    ///     }
    /// }))
    /// .unwrap();
    ///
    /// let plan = config.resolve(Environment::Production).unwrap();
    /// assert!(plan.output().filename.has_content_hash());
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        let config: PlanConfig = serde_json::from_value(value)
            .map_err(|e| ConfigError::invalid_value("config", e.to_string()))?;
        config.finish()
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: PlanConfig = toml::from_str(source).map_err(|e| ConfigError::InvalidValue {
            field: "toml".to_string(),
            hint: Some(format!("Invalid TOML: {e}")),
        })?;
        config.finish()
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::invalid_value("config", e.to_string()))
    }

    /// Name unnamed profiles after their table and validate them.
    pub(crate) fn finish(mut self) -> Result<Self> {
        let slots = [
            (&mut self.base, "base"),
            (&mut self.development, Environment::Development.as_str()),
            (&mut self.production, Environment::Production.as_str()),
        ];
        for (slot, name) in slots {
            if let Some(profile) = slot {
                if profile.name.is_empty() {
                    profile.name = name.to_string();
                }
                SchemaValidator.validate(profile)?;
            }
        }
        Ok(self)
    }

    pub fn base(&self) -> Result<Cow<'_, Profile>> {
        match &self.base {
            Some(profile) => Ok(Cow::Borrowed(profile)),
            None => Ok(Cow::Owned(presets::base_profile()?)),
        }
    }

    pub fn environment(&self, env: Environment) -> Result<Cow<'_, Profile>> {
        let declared = match env {
            Environment::Development => &self.development,
            Environment::Production => &self.production,
        };
        match declared {
            Some(profile) => Ok(Cow::Borrowed(profile)),
            None => Ok(Cow::Owned(presets::environment_profile(env)?)),
        }
    }

    /// Merge the base profile with the profile for `env`.
    pub fn resolve(&self, env: Environment) -> Result<BuildPlan> {
        debug!(
            %env,
            custom_base = self.base.is_some(),
            custom_environment = match env {
                Environment::Development => self.development.is_some(),
                Environment::Production => self.production.is_some(),
            },
            "resolving build plan"
        );
        let base = self.base()?;
        let overlay = self.environment(env)?;
        merge(&base, &overlay, env)
    }
}

/// Resolve a plan from the built-in presets.
///
/// # Example
///
/// ```
/// use packplan_config::{resolve, Environment};
///
/// let plan = resolve(Environment::Development).unwrap();
/// assert_eq!(plan.output().filename.to_string(), "[name].js");
/// ```
pub fn resolve(env: Environment) -> Result<BuildPlan> {
    PlanConfig::default().resolve(env)
}
