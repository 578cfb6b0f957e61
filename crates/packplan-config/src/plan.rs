//! The resolved, environment-specific build plan handed to the bundler.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::environment::Environment;
use crate::error::{ConfigError, ConfigWarning, Result};
use crate::profile::{
    applicable, CacheGroup, EntryPoints, OptimizationPolicy, Plugin, ResolvedOutput, Rule,
    Transform,
};
use crate::template::{content_hash, RenderContext};

/// Base profile merged with exactly one environment profile.
///
/// Only [`merge`](crate::merge) constructs a plan, and nothing mutates it
/// afterwards. Serialization is deterministic: the same inputs always
/// produce byte-identical JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    mode: Environment,
    entry: EntryPoints,
    output: ResolvedOutput,
    rules: Vec<Rule>,
    plugins: Vec<Plugin>,
    optimization: OptimizationPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    records_path: Option<PathBuf>,
    #[serde(skip)]
    warnings: Vec<ConfigWarning>,
}

impl BuildPlan {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        mode: Environment,
        entry: EntryPoints,
        output: ResolvedOutput,
        rules: Vec<Rule>,
        plugins: Vec<Plugin>,
        optimization: OptimizationPolicy,
        context: Option<PathBuf>,
        records_path: Option<PathBuf>,
    ) -> Self {
        Self {
            mode,
            entry,
            output,
            rules,
            plugins,
            optimization,
            context,
            records_path,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn set_warnings(&mut self, warnings: Vec<ConfigWarning>) {
        self.warnings = warnings;
    }

    pub fn mode(&self) -> Environment {
        self.mode
    }

    pub fn entries(&self) -> &EntryPoints {
        &self.entry
    }

    pub fn output(&self) -> &ResolvedOutput {
        &self.output
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn optimization(&self) -> &OptimizationPolicy {
        &self.optimization
    }

    pub fn context(&self) -> Option<&Path> {
        self.context.as_deref()
    }

    /// Build-record file the bundler keeps module identifiers in.
    pub fn records_path(&self) -> Option<&Path> {
        self.records_path.as_deref()
    }

    /// Non-fatal findings collected while merging.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Rules that apply to `path`, in application order.
    pub fn rules_for(&self, path: &str) -> Vec<&Rule> {
        applicable(&self.rules, path)
    }

    /// The full transform chain for `path`, rule by rule.
    pub fn transforms_for(&self, path: &str) -> Vec<&Transform> {
        self.rules_for(path)
            .into_iter()
            .flat_map(|rule| rule.transforms.iter())
            .collect()
    }

    /// The cache group a module at `path` is split into, if any.
    pub fn cache_group_for(&self, path: &str) -> Option<(&str, &CacheGroup)> {
        self.optimization.split_chunks.cache_group_for(path)
    }

    /// Names of the output units an HTML page may inject.
    ///
    /// Entries, named cache groups and, when the runtime is split out,
    /// one `runtime~<entry>` unit per entry.
    pub fn output_units(&self) -> Vec<String> {
        let mut units: Vec<String> = self.entry.keys().cloned().collect();
        units.extend(
            self.optimization
                .split_chunks
                .cache_groups
                .values()
                .filter_map(|group| group.name.clone()),
        );
        if self.optimization.runtime_chunk == Some(true) {
            units.extend(self.entry.keys().map(|name| format!("runtime~{name}")));
        }
        units
    }

    pub(crate) fn unknown_output_units(&self) -> Vec<ConfigWarning> {
        let known = self.output_units();
        self.plugins
            .iter()
            .filter_map(|plugin| match plugin {
                Plugin::Html(opts) => opts.chunks.as_ref(),
                _ => None,
            })
            .flatten()
            .filter(|unit| !known.contains(unit))
            .map(|unit| ConfigWarning::UnknownOutputUnit { unit: unit.clone() })
            .collect()
    }

    /// Render the top-level filename for `entry` given its emitted bytes.
    ///
    /// Returns `None` for unknown entries.
    pub fn filename_for(&self, entry: &str, contents: &[u8]) -> Option<String> {
        let id = self.entry.get_index_of(entry)?;
        let hash = content_hash(contents);
        let ctx = RenderContext {
            name: Some(entry),
            id: u32::try_from(id).ok(),
            ext: Some("js"),
            hash: Some(&hash),
            chunk_hash: Some(&hash),
            content_hash: Some(&hash),
            ..Default::default()
        };
        Some(self.output.filename.render(&ctx))
    }

    /// Where the manifest plugin writes its manifest, if one is configured.
    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.plugins.iter().find_map(|plugin| match plugin {
            Plugin::Manifest(opts) => Some(self.output.path.join(&opts.file_name)),
            _ => None,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ConfigError::invalid_value("plan", e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::invalid_value("plan", e.to_string()))
    }
}
