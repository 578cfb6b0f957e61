//! Loaders and their typed options.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::template::FilenameTemplate;

/// Wire form of a transform reference: a bare identifier or `{loader, options}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformSpec {
    Name(String),
    Full {
        loader: String,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        options: Map<String, Value>,
    },
}

/// One per-file conversion step in a rule's chain.
///
/// Known loaders carry typed options that are checked when the transform is
/// constructed. Anything else is kept verbatim as [`Transform::External`] and
/// left for the bundler to resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransformSpec", into = "TransformSpec")]
pub enum Transform {
    Babel(BabelOptions),
    SvgUrl(SvgUrlOptions),
    Url(UrlOptions),
    File(FileOptions),
    ImageCompress(ImageCompressOptions),
    Raw,
    Style,
    Css(CssLoaderOptions),
    PostCss,
    ExtractCss,
    External {
        loader: String,
        options: Map<String, Value>,
    },
}

impl Transform {
    pub const BABEL: &'static str = "babel-loader";
    pub const SVG_URL: &'static str = "svg-url-loader";
    pub const URL: &'static str = "url-loader";
    pub const FILE: &'static str = "file-loader";
    pub const IMAGE_COMPRESS: &'static str = "image-webpack-loader";
    pub const RAW: &'static str = "raw-loader";
    pub const STYLE: &'static str = "style-loader";
    pub const CSS: &'static str = "css-loader";
    pub const POSTCSS: &'static str = "postcss-loader";
    pub const EXTRACT_CSS: &'static str = "mini-css-extract-plugin/loader";

    pub fn external(loader: impl Into<String>) -> Self {
        Transform::External {
            loader: loader.into(),
            options: Map::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Transform::Babel(_) => Self::BABEL,
            Transform::SvgUrl(_) => Self::SVG_URL,
            Transform::Url(_) => Self::URL,
            Transform::File(_) => Self::FILE,
            Transform::ImageCompress(_) => Self::IMAGE_COMPRESS,
            Transform::Raw => Self::RAW,
            Transform::Style => Self::STYLE,
            Transform::Css(_) => Self::CSS,
            Transform::PostCss => Self::POSTCSS,
            Transform::ExtractCss => Self::EXTRACT_CSS,
            Transform::External { loader, .. } => loader,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Transform::External { .. })
    }

    /// Size threshold below which the asset is inlined instead of emitted.
    pub fn inline_limit(&self) -> Option<u64> {
        match self {
            Transform::SvgUrl(opts) => opts.limit,
            Transform::Url(opts) => opts.limit,
            _ => None,
        }
    }

    fn options(&self) -> Map<String, Value> {
        let value = match self {
            Transform::Babel(opts) => serde_json::to_value(opts),
            Transform::SvgUrl(opts) => serde_json::to_value(opts),
            Transform::Url(opts) => serde_json::to_value(opts),
            Transform::File(opts) => serde_json::to_value(opts),
            Transform::ImageCompress(opts) => serde_json::to_value(opts),
            Transform::Css(opts) => serde_json::to_value(opts),
            Transform::External { options, .. } => return options.clone(),
            Transform::Raw | Transform::Style | Transform::PostCss | Transform::ExtractCss => {
                return Map::new();
            }
        };
        match value {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

fn typed<T>(loader: &str, options: Map<String, Value>) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(Value::Object(options)).map_err(|err| {
        ConfigError::invalid_value(format!("{loader}.options"), err.to_string())
    })
}

fn no_options(loader: &str, options: &Map<String, Value>) -> Result<(), ConfigError> {
    if options.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(
            format!("{loader}.options"),
            format!("`{loader}` takes no options"),
        ))
    }
}

impl TryFrom<TransformSpec> for Transform {
    type Error = ConfigError;

    fn try_from(spec: TransformSpec) -> Result<Self, Self::Error> {
        let (loader, options) = match spec {
            TransformSpec::Name(loader) => (loader, Map::new()),
            TransformSpec::Full { loader, options } => (loader, options),
        };

        let transform = match loader.as_str() {
            Self::BABEL => Transform::Babel(typed(&loader, options)?),
            Self::SVG_URL => Transform::SvgUrl(typed(&loader, options)?),
            Self::URL => Transform::Url(typed(&loader, options)?),
            Self::FILE => Transform::File(typed(&loader, options)?),
            Self::IMAGE_COMPRESS => Transform::ImageCompress(typed(&loader, options)?),
            Self::CSS => Transform::Css(typed(&loader, options)?),
            Self::RAW => {
                no_options(&loader, &options)?;
                Transform::Raw
            }
            Self::STYLE => {
                no_options(&loader, &options)?;
                Transform::Style
            }
            Self::POSTCSS => {
                no_options(&loader, &options)?;
                Transform::PostCss
            }
            Self::EXTRACT_CSS => {
                no_options(&loader, &options)?;
                Transform::ExtractCss
            }
            _ => Transform::External { loader, options },
        };
        Ok(transform)
    }
}

impl From<Transform> for TransformSpec {
    fn from(transform: Transform) -> Self {
        let options = transform.options();
        let loader = transform.identifier().to_string();
        if options.is_empty() {
            TransformSpec::Name(loader)
        } else {
            TransformSpec::Full { loader, options }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BabelOptions {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cache_directory: bool,
}

/// Inlines SVGs as UTF-8 data URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SvgUrlOptions {
    /// Files above this size (bytes) fall back to being emitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    /// Strip quotes around the encoded URL
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub noquotes: bool,
}

/// Inlines small files as base64 data URLs and emits the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UrlOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    /// Name of the emitted file when above the limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<FilenameTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<FilenameTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImageCompressOptions {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CssLoaderOptions {
    /// Number of loaders applied before css-loader on `@import`ed files
    #[serde(default, skip_serializing_if = "is_zero")]
    pub import_loaders: u8,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub modules: bool,
}

fn is_zero(value: &u8) -> bool {
    *value == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_identifier_parses_to_typed_variant() {
        let transform: Transform = serde_json::from_value(json!("babel-loader")).unwrap();
        assert_eq!(transform, Transform::Babel(BabelOptions::default()));
        assert!(!transform.is_external());
    }

    #[test]
    fn typed_options_are_checked() {
        let transform: Transform = serde_json::from_value(json!({
            "loader": "url-loader",
            "options": { "limit": 10240, "name": "assets/[name].[contenthash].[ext]" }
        }))
        .unwrap();
        assert_eq!(transform.inline_limit(), Some(10240));

        let err = serde_json::from_value::<Transform>(json!({
            "loader": "url-loader",
            "options": { "limt": 10240 }
        }));
        assert!(err.is_err());
    }

    #[test]
    fn bad_template_in_options_is_rejected() {
        let result = serde_json::from_value::<Transform>(json!({
            "loader": "file-loader",
            "options": { "name": "[name].[bogus]" }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn unit_loaders_reject_options() {
        let result = serde_json::from_value::<Transform>(json!({
            "loader": "raw-loader",
            "options": { "esModule": false }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_loader_is_external() {
        let transform: Transform = serde_json::from_value(json!({
            "loader": "sass-loader",
            "options": { "sourceMap": true }
        }))
        .unwrap();
        assert!(transform.is_external());
        assert_eq!(transform.identifier(), "sass-loader");
    }

    #[test]
    fn serializes_back_to_wire_form() {
        let css = Transform::Css(CssLoaderOptions {
            import_loaders: 1,
            modules: false,
        });
        assert_eq!(
            serde_json::to_value(&css).unwrap(),
            json!({ "loader": "css-loader", "options": { "importLoaders": 1 } })
        );
        assert_eq!(serde_json::to_value(Transform::Raw).unwrap(), json!("raw-loader"));
    }
}
