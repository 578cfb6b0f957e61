//! Profile data model shared by base and environment definitions.

mod helpers;
mod optimization;
mod output;
mod plugin;
mod rule;
mod transform;

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use helpers::DEFAULT_INLINE_LIMIT;
pub use optimization::{CacheGroup, ChunksMode, OptimizationPolicy, SplitChunks};
pub use output::{OutputSpec, ResolvedOutput};
pub use plugin::{
    AnalyzerMode, BundleAnalyzerOptions, CssMinifyOptions, ExtractCssOptions, HtmlOptions,
    ManifestOptions, MinifyOptions, Plugin, PluginKind, PluginSpec,
};
pub use rule::{applicable, Enforce, Phase, Rule};
pub use transform::{
    BabelOptions, CssLoaderOptions, FileOptions, ImageCompressOptions, SvgUrlOptions, Transform,
    TransformSpec, UrlOptions,
};

use crate::error::{ConfigError, ConfigWarning, Result};
use crate::template::FilenameTemplate;
use crate::validation::{ConfigValidator, SchemaValidator};

/// Entry name → source module path, in declaration order.
pub type EntryPoints = IndexMap<String, PathBuf>;

/// A composable set of build configuration facts.
///
/// A base profile and an environment profile share this shape. Values the
/// base leaves out (filename templates, CSS and raster-image rules) are
/// supplied by the environment when the two are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Used in error messages to say which declaration is at fault
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default)]
    pub entry: EntryPoints,

    #[serde(default)]
    pub output: OutputSpec,

    #[serde(default)]
    pub rules: Vec<Rule>,

    #[serde(default)]
    pub plugins: Vec<Plugin>,

    #[serde(default)]
    pub optimization: OptimizationPolicy,

    /// Base directory entry paths are relative to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<PathBuf>,

    /// File the bundler uses to record module identifiers across builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_path: Option<PathBuf>,
}

impl Profile {
    pub fn builder(name: impl Into<String>) -> ProfileBuilder {
        ProfileBuilder::new(name)
    }

    /// Create from serde_json::Value, validating the result.
    ///
    /// # Example
    ///
    /// ```
    /// use packplan_config::Profile;
    /// use serde_json::json;
    ///
    /// let profile = Profile::from_value(json!({
    ///     "name": "base",
    ///     "entry": { "index": "./src/index.js" },
    ///     "rules": [{ "test": "\\.txt$", "use": "raw-loader" }]
    /// }))
    /// .unwrap();
    /// assert_eq!(profile.rules.len(), 1);
    /// ```
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let profile: Profile = serde_json::from_value(value)
            .map_err(|e| ConfigError::invalid_value("profile", e.to_string()))?;
        SchemaValidator.validate(&profile)?;
        Ok(profile)
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::invalid_value("profile", e.to_string()))
    }

    /// Identifiers this profile references that are not known locally.
    pub fn unresolved_references(&self) -> Vec<ConfigWarning> {
        let warn = |field: String, identifier: &str| ConfigWarning::UnresolvedReference {
            profile: self.name.clone(),
            field,
            identifier: identifier.to_string(),
        };

        let mut warnings = Vec::new();
        for (index, rule) in self.rules.iter().enumerate() {
            for (position, transform) in rule.transforms.iter().enumerate() {
                if transform.is_external() {
                    warnings.push(warn(
                        format!("rules[{index}].use[{position}]"),
                        transform.identifier(),
                    ));
                }
            }
        }
        for (index, plugin) in self.plugins.iter().enumerate() {
            if plugin.is_external() {
                warnings.push(warn(format!("plugins[{index}]"), plugin.identifier()));
            }
        }
        for (index, plugin) in self.optimization.minimizer.iter().enumerate() {
            if plugin.is_external() {
                warnings.push(warn(
                    format!("optimization.minimizer[{index}]"),
                    plugin.identifier(),
                ));
            }
        }
        warnings
    }
}

/// Builds a [`Profile`] and validates it in one step.
///
/// # Example
///
/// ```
/// use packplan_config::{Profile, Rule, Transform};
///
/// let profile = Profile::builder("base")
///     .entry("index", "./src/index.js")
///     .output_path("dist/static")
///     .rule(Rule::new(r"\.txt$").with(Transform::Raw))
///     .build()
///     .unwrap();
///
/// assert_eq!(profile.entry.len(), 1);
/// assert!(profile.output.filename.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    name: String,
    entries: Vec<(String, PathBuf)>,
    output_path: Option<PathBuf>,
    public_path: Option<String>,
    filename: Option<String>,
    chunk_filename: Option<String>,
    rules: Vec<Rule>,
    plugins: Vec<Plugin>,
    optimization: OptimizationPolicy,
    cache_groups: Vec<(String, CacheGroup)>,
    context: Option<PathBuf>,
    records_path: Option<PathBuf>,
}

impl ProfileBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn entry(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.entries.push((name.into(), path.into()));
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn public_path(mut self, prefix: impl Into<String>) -> Self {
        self.public_path = Some(prefix.into());
        self
    }

    pub fn filename(mut self, template: impl Into<String>) -> Self {
        self.filename = Some(template.into());
        self
    }

    pub fn chunk_filename(mut self, template: impl Into<String>) -> Self {
        self.chunk_filename = Some(template.into());
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn chunks(mut self, mode: ChunksMode) -> Self {
        self.optimization.split_chunks.chunks = Some(mode);
        self
    }

    pub fn chunk_names(mut self, enabled: bool) -> Self {
        self.optimization.split_chunks.name = Some(enabled);
        self
    }

    pub fn cache_group(mut self, name: impl Into<String>, group: CacheGroup) -> Self {
        self.cache_groups.push((name.into(), group));
        self
    }

    pub fn runtime_chunk(mut self, enabled: bool) -> Self {
        self.optimization.runtime_chunk = Some(enabled);
        self
    }

    pub fn occurrence_order(mut self, enabled: bool) -> Self {
        self.optimization.occurrence_order = Some(enabled);
        self
    }

    pub fn minimizer(mut self, plugin: Plugin) -> Self {
        self.optimization.minimizer.push(plugin);
        self
    }

    pub fn context(mut self, dir: impl Into<PathBuf>) -> Self {
        self.context = Some(dir.into());
        self
    }

    pub fn records_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.records_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Profile> {
        let mut entry = EntryPoints::with_capacity(self.entries.len());
        for (name, path) in self.entries {
            match entry.get(&name) {
                Some(existing) if *existing != path => {
                    return Err(ConfigError::conflict(
                        &self.name,
                        format!("entry.{name}"),
                        format!(
                            "declared twice with different paths ({} and {})",
                            existing.display(),
                            path.display()
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    entry.insert(name, path);
                }
            }
        }

        let mut optimization = self.optimization;
        for (name, group) in self.cache_groups {
            if optimization.split_chunks.cache_groups.contains_key(&name) {
                return Err(ConfigError::conflict(
                    &self.name,
                    format!("optimization.splitChunks.cacheGroups.{name}"),
                    "cache group declared twice",
                ));
            }
            optimization.split_chunks.cache_groups.insert(name, group);
        }

        let output = OutputSpec {
            path: self.output_path,
            public_path: self.public_path,
            filename: self
                .filename
                .as_deref()
                .map(FilenameTemplate::parse)
                .transpose()?,
            chunk_filename: self
                .chunk_filename
                .as_deref()
                .map(FilenameTemplate::parse)
                .transpose()?,
        };

        let profile = Profile {
            name: self.name,
            entry,
            output,
            rules: self.rules,
            plugins: self.plugins,
            optimization,
            context: self.context,
            records_path: self.records_path,
        };

        SchemaValidator.validate(&profile)?;
        Ok(profile)
    }
}
