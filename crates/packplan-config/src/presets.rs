//! Built-in profiles for a single-page application.
//!
//! The base profile holds everything that never differs by environment.
//! Filename templates, CSS handling and raster-image handling are left to
//! the environment profiles.

use crate::environment::Environment;
use crate::error::Result;
use crate::profile::{
    BabelOptions, BundleAnalyzerOptions, CacheGroup, ChunksMode, CssLoaderOptions,
    CssMinifyOptions, Enforce, ExtractCssOptions, FileOptions, HtmlOptions, ImageCompressOptions,
    ManifestOptions, MinifyOptions, Plugin, Profile, ProfileBuilder, Rule, SvgUrlOptions,
    Transform, UrlOptions, DEFAULT_INLINE_LIMIT,
};
use crate::template::FilenameTemplate;

pub const OUTPUT_DIR: &str = "dist/static";
pub const PUBLIC_PATH: &str = "/static/";
pub const MANIFEST_FILE: &str = "webpackManifest.json";
pub const RECORDS_FILE: &str = "webpackRecords.json";
pub const VENDOR_PATTERN: &str = r"[\\/]node_modules[\\/]";

const EXCLUDE_DEPENDENCIES: &str = "node_modules";
const CSS_PATTERN: &str = r"\.css$";
const RASTER_PATTERN: &str = r"\.(png|jpe?g|gif)$";

/// Base profile with the asset manifest.
pub fn base_profile() -> Result<Profile> {
    shared_base("base")
        .entry("index", "./src/index.js")
        .plugin(Plugin::Manifest(ManifestOptions {
            file_name: MANIFEST_FILE.to_string(),
        }))
        .build()
}

/// Second base variant: adds the blog page entry and deterministic module
/// ids in place of the manifest.
pub fn multi_page_base_profile() -> Result<Profile> {
    shared_base("base-multi-page")
        .entry("index", "./src/index.js")
        .entry("blog", "./src/pages/Blog/blog.js")
        .plugin(Plugin::HashedModuleIds)
        .build()
}

fn shared_base(name: &str) -> ProfileBuilder {
    Profile::builder(name)
        .output_path(OUTPUT_DIR)
        .rule(
            Rule::new(r"\.(js|jsx)$")
                .with(Transform::Babel(BabelOptions::default()))
                .exclude(EXCLUDE_DEPENDENCIES),
        )
        .rule(
            Rule::new(r"\.(svg)$")
                .with(Transform::SvgUrl(SvgUrlOptions {
                    limit: Some(DEFAULT_INLINE_LIMIT),
                    noquotes: true,
                }))
                .exclude(EXCLUDE_DEPENDENCIES),
        )
        // compression has to see the file before the emitting loaders do
        .rule(
            Rule::new(r"\.(png|jpe?g|gif|svg)$")
                .with(Transform::ImageCompress(ImageCompressOptions::default()))
                .exclude(EXCLUDE_DEPENDENCIES)
                .enforce(Enforce::Pre),
        )
        .rule(
            Rule::new(r"\.(woff|woff2|eot|ttf|otf)$")
                .with(Transform::File(FileOptions::default())),
        )
        .rule(
            Rule::new(r"\.txt$")
                .with(Transform::Raw)
                .exclude(EXCLUDE_DEPENDENCIES),
        )
        .chunks(ChunksMode::All)
        .cache_group(
            "vendors",
            CacheGroup::new(VENDOR_PATTERN, -10).named("vendors"),
        )
        .runtime_chunk(true)
        .occurrence_order(true)
        .records_path(RECORDS_FILE)
}

/// Readable names, injected styles, no minification.
pub fn development_profile() -> Result<Profile> {
    Profile::builder("development")
        .public_path(PUBLIC_PATH)
        .filename("[name].js")
        .chunk_filename("[name].js")
        .rule(css_rule(Transform::Style))
        .rule(
            Rule::new(RASTER_PATTERN)
                .with(Transform::File(FileOptions {
                    name: Some(FilenameTemplate::parse("assets/[name].[ext]")?),
                }))
                .exclude(EXCLUDE_DEPENDENCIES),
        )
        .plugin(Plugin::Html(HtmlOptions {
            template: Some("src/html-templates/index_dev.html".into()),
            chunks: None,
            filename: "../index.html".to_string(),
        }))
        .plugin(Plugin::NamedModules)
        .plugin(Plugin::HotModuleReplacement)
        .build()
}

/// Content-hashed names, extracted styles, minifiers and bundle analysis.
pub fn production_profile() -> Result<Profile> {
    Profile::builder("production")
        .public_path(PUBLIC_PATH)
        .filename("[name].[contenthash].js")
        // ids instead of names keep the chunk-to-filename map small
        .chunk_filename("[id].[contenthash].js")
        .rule(css_rule(Transform::ExtractCss))
        .rule(
            Rule::new(RASTER_PATTERN)
                .with(Transform::Url(UrlOptions {
                    limit: Some(DEFAULT_INLINE_LIMIT),
                    name: Some(FilenameTemplate::parse(
                        "assets/[name].[contenthash].[ext]",
                    )?),
                }))
                .exclude(EXCLUDE_DEPENDENCIES),
        )
        .plugin(Plugin::ExtractCss(ExtractCssOptions {
            filename: Some(FilenameTemplate::parse("[name].[contenthash].css")?),
            chunk_filename: Some(FilenameTemplate::parse("[id].[contenthash].css")?),
        }))
        .plugin(Plugin::Html(HtmlOptions {
            template: Some("src/html-templates/index_prod.html".into()),
            chunks: Some(vec![
                "index".to_string(),
                "vendors".to_string(),
                "runtime~index".to_string(),
            ]),
            filename: "../index.html".to_string(),
        }))
        .plugin(Plugin::HashedModuleIds)
        .plugin(Plugin::BundleAnalyzer(BundleAnalyzerOptions::default()))
        .chunk_names(false)
        .minimizer(Plugin::Uglify(MinifyOptions {
            cache: true,
            parallel: true,
            source_map: false,
        }))
        .minimizer(Plugin::Terser(MinifyOptions::default()))
        .minimizer(Plugin::OptimizeCssAssets(CssMinifyOptions::default()))
        .build()
}

/// The built-in environment profile for `env`.
pub fn environment_profile(env: Environment) -> Result<Profile> {
    match env {
        Environment::Development => development_profile(),
        Environment::Production => production_profile(),
    }
}

fn css_rule(first: Transform) -> Rule {
    Rule::new(CSS_PATTERN)
        .with(first)
        .with(Transform::Css(CssLoaderOptions {
            import_loaders: 1,
            modules: false,
        }))
        .with(Transform::PostCss)
        .exclude(EXCLUDE_DEPENDENCIES)
}
