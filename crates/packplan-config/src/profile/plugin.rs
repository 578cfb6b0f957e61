//! Build plugins and their typed options.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::profile::helpers::{
    default_css_processor, default_html_filename, default_manifest_filename, default_true,
};
use crate::template::FilenameTemplate;

/// Wire form of a plugin reference: a bare identifier or `{plugin, options}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginSpec {
    Name(String),
    Full {
        plugin: String,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        options: Map<String, Value>,
    },
}

/// Where a plugin may appear in a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    /// Applies to the whole build (`plugins`)
    Build,
    /// Minifies emitted outputs (`optimization.minimizer`)
    Minimizer,
    /// Not known locally; accepted in either position
    Unknown,
}

/// A whole-build step, as opposed to a per-file [`Transform`](crate::Transform).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PluginSpec", into = "PluginSpec")]
pub enum Plugin {
    Manifest(ManifestOptions),
    ExtractCss(ExtractCssOptions),
    Html(HtmlOptions),
    HashedModuleIds,
    NamedModules,
    HotModuleReplacement,
    BundleAnalyzer(BundleAnalyzerOptions),
    Terser(MinifyOptions),
    Uglify(MinifyOptions),
    OptimizeCssAssets(CssMinifyOptions),
    External {
        plugin: String,
        options: Map<String, Value>,
    },
}

impl Plugin {
    pub const MANIFEST: &'static str = "webpack-manifest-plugin";
    pub const EXTRACT_CSS: &'static str = "mini-css-extract-plugin";
    pub const HTML: &'static str = "html-webpack-plugin";
    pub const HASHED_MODULE_IDS: &'static str = "webpack.HashedModuleIdsPlugin";
    pub const NAMED_MODULES: &'static str = "webpack.NamedModulesPlugin";
    pub const HOT_MODULE_REPLACEMENT: &'static str = "webpack.HotModuleReplacementPlugin";
    pub const BUNDLE_ANALYZER: &'static str = "webpack-bundle-analyzer";
    pub const TERSER: &'static str = "terser-webpack-plugin";
    pub const UGLIFY: &'static str = "uglifyjs-webpack-plugin";
    pub const OPTIMIZE_CSS_ASSETS: &'static str = "optimize-css-assets-webpack-plugin";

    pub fn external(plugin: impl Into<String>) -> Self {
        Plugin::External {
            plugin: plugin.into(),
            options: Map::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Plugin::Manifest(_) => Self::MANIFEST,
            Plugin::ExtractCss(_) => Self::EXTRACT_CSS,
            Plugin::Html(_) => Self::HTML,
            Plugin::HashedModuleIds => Self::HASHED_MODULE_IDS,
            Plugin::NamedModules => Self::NAMED_MODULES,
            Plugin::HotModuleReplacement => Self::HOT_MODULE_REPLACEMENT,
            Plugin::BundleAnalyzer(_) => Self::BUNDLE_ANALYZER,
            Plugin::Terser(_) => Self::TERSER,
            Plugin::Uglify(_) => Self::UGLIFY,
            Plugin::OptimizeCssAssets(_) => Self::OPTIMIZE_CSS_ASSETS,
            Plugin::External { plugin, .. } => plugin,
        }
    }

    pub fn kind(&self) -> PluginKind {
        match self {
            Plugin::Terser(_) | Plugin::Uglify(_) | Plugin::OptimizeCssAssets(_) => {
                PluginKind::Minimizer
            }
            Plugin::External { .. } => PluginKind::Unknown,
            _ => PluginKind::Build,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Plugin::External { .. })
    }

    fn options(&self) -> Map<String, Value> {
        let value = match self {
            Plugin::Manifest(opts) => serde_json::to_value(opts),
            Plugin::ExtractCss(opts) => serde_json::to_value(opts),
            Plugin::Html(opts) => serde_json::to_value(opts),
            Plugin::BundleAnalyzer(opts) => serde_json::to_value(opts),
            Plugin::Terser(opts) | Plugin::Uglify(opts) => serde_json::to_value(opts),
            Plugin::OptimizeCssAssets(opts) => serde_json::to_value(opts),
            Plugin::External { options, .. } => return options.clone(),
            Plugin::HashedModuleIds | Plugin::NamedModules | Plugin::HotModuleReplacement => {
                return Map::new();
            }
        };
        match value {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

fn typed<T>(plugin: &str, options: Map<String, Value>) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(Value::Object(options)).map_err(|err| {
        ConfigError::invalid_value(format!("{plugin}.options"), err.to_string())
    })
}

fn no_options(plugin: &str, options: &Map<String, Value>) -> Result<(), ConfigError> {
    if options.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(
            format!("{plugin}.options"),
            format!("`{plugin}` takes no options"),
        ))
    }
}

impl TryFrom<PluginSpec> for Plugin {
    type Error = ConfigError;

    fn try_from(spec: PluginSpec) -> Result<Self, Self::Error> {
        let (plugin, options) = match spec {
            PluginSpec::Name(plugin) => (plugin, Map::new()),
            PluginSpec::Full { plugin, options } => (plugin, options),
        };

        let parsed = match plugin.as_str() {
            Self::MANIFEST => Plugin::Manifest(typed(&plugin, options)?),
            Self::EXTRACT_CSS => Plugin::ExtractCss(typed(&plugin, options)?),
            Self::HTML => Plugin::Html(typed(&plugin, options)?),
            Self::BUNDLE_ANALYZER => Plugin::BundleAnalyzer(typed(&plugin, options)?),
            Self::TERSER => Plugin::Terser(typed(&plugin, options)?),
            Self::UGLIFY => Plugin::Uglify(typed(&plugin, options)?),
            Self::OPTIMIZE_CSS_ASSETS => Plugin::OptimizeCssAssets(typed(&plugin, options)?),
            Self::HASHED_MODULE_IDS => {
                no_options(&plugin, &options)?;
                Plugin::HashedModuleIds
            }
            Self::NAMED_MODULES => {
                no_options(&plugin, &options)?;
                Plugin::NamedModules
            }
            Self::HOT_MODULE_REPLACEMENT => {
                no_options(&plugin, &options)?;
                Plugin::HotModuleReplacement
            }
            _ => Plugin::External { plugin, options },
        };
        Ok(parsed)
    }
}

impl From<Plugin> for PluginSpec {
    fn from(plugin: Plugin) -> Self {
        let options = plugin.options();
        let name = plugin.identifier().to_string();
        if options.is_empty() {
            PluginSpec::Name(name)
        } else {
            PluginSpec::Full {
                plugin: name,
                options,
            }
        }
    }
}

/// Emits a manifest mapping logical asset names to hashed output paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ManifestOptions {
    #[serde(default = "default_manifest_filename")]
    pub file_name: String,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            file_name: default_manifest_filename(),
        }
    }
}

/// Extracts CSS into standalone files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExtractCssOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<FilenameTemplate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_filename: Option<FilenameTemplate>,
}

/// Generates the HTML page that loads the listed output units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HtmlOptions {
    /// Template path, relative to the project context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    /// Output units to inject, in order. `None` injects every unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<String>>,

    /// Output filename, relative to the output directory
    #[serde(default = "default_html_filename")]
    pub filename: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            template: None,
            chunks: None,
            filename: default_html_filename(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerMode {
    /// Serve an interactive report
    #[default]
    Server,
    /// Write a standalone HTML report
    Static,
    /// Only collect stats
    Disabled,
}

/// Bundle-size treemap report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundleAnalyzerOptions {
    #[serde(default)]
    pub analyzer_mode: AnalyzerMode,

    #[serde(default = "default_true")]
    pub open_analyzer: bool,
}

impl Default for BundleAnalyzerOptions {
    fn default() -> Self {
        Self {
            analyzer_mode: AnalyzerMode::default(),
            open_analyzer: true,
        }
    }
}

/// Options shared by the script minimizers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MinifyOptions {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cache: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub parallel: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub source_map: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CssMinifyOptions {
    #[serde(default = "default_css_processor")]
    pub css_processor: String,
}

impl Default for CssMinifyOptions {
    fn default() -> Self {
        Self {
            css_processor: default_css_processor(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn html_plugin_options_parse() {
        let plugin: Plugin = serde_json::from_value(json!({
            "plugin": "html-webpack-plugin",
            "options": {
                "template": "src/html-templates/index_prod.html",
                "chunks": ["index", "vendors", "runtime~index"],
                "filename": "../index.html"
            }
        }))
        .unwrap();

        let Plugin::Html(opts) = &plugin else {
            panic!("expected html plugin, got {plugin:?}");
        };
        assert_eq!(opts.filename, "../index.html");
        assert_eq!(opts.chunks.as_ref().map(Vec::len), Some(3));
        assert_eq!(plugin.kind(), PluginKind::Build);
    }

    #[test]
    fn minimizers_are_classified() {
        let plugin: Plugin = serde_json::from_value(json!("terser-webpack-plugin")).unwrap();
        assert_eq!(plugin.kind(), PluginKind::Minimizer);
        assert_eq!(
            Plugin::OptimizeCssAssets(CssMinifyOptions::default()).kind(),
            PluginKind::Minimizer
        );
    }

    #[test]
    fn unit_plugins_reject_options() {
        let result = serde_json::from_value::<Plugin>(json!({
            "plugin": "webpack.HashedModuleIdsPlugin",
            "options": { "hashDigest": "hex" }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_plugin_is_external() {
        let plugin: Plugin = serde_json::from_value(json!("copy-webpack-plugin")).unwrap();
        assert!(plugin.is_external());
        assert_eq!(plugin.kind(), PluginKind::Unknown);
    }

    #[test]
    fn manifest_serializes_with_options() {
        let plugin = Plugin::Manifest(ManifestOptions {
            file_name: "webpackManifest.json".into(),
        });
        assert_eq!(
            serde_json::to_value(&plugin).unwrap(),
            json!({
                "plugin": "webpack-manifest-plugin",
                "options": { "fileName": "webpackManifest.json" }
            })
        );
    }
}
