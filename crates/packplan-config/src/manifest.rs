//! Reader for the asset manifest the bundler writes after a build.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::plan::BuildPlan;

/// Logical asset name → emitted file, in the order the bundler wrote them.
///
/// # Example
///
/// ```
/// use packplan_config::AssetManifest;
///
/// let manifest = AssetManifest::from_json(
///     r#"{ "index.js": "/static/index.3f2a9c.js", "vendors.js": "/static/vendors.77e1d0.js" }"#,
/// )
/// .unwrap();
/// assert_eq!(manifest.get("index.js"), Some("/static/index.3f2a9c.js"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
    assets: IndexMap<String, String>,
}

impl AssetManifest {
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| ConfigError::InvalidValue {
            field: "manifest".to_string(),
            hint: Some(format!("Invalid JSON: {e}")),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Read the manifest `plan` tells the bundler to write.
    ///
    /// `Ok(None)` when the plan has no manifest plugin.
    pub fn load_for(plan: &BuildPlan) -> Result<Option<Self>> {
        plan.manifest_path().map(Self::load).transpose()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.assets.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assets.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
