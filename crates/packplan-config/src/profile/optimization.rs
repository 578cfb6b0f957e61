//! Chunk splitting, runtime chunk and minimizer settings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::pattern::Matcher;
use crate::profile::plugin::Plugin;

/// Which chunks the split-chunks pass may optimise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunksMode {
    /// Only on-demand imports (bundler default)
    #[default]
    Async,
    /// Only entry-point imports
    Initial,
    /// Both; affects the script tags of the generated page
    All,
}

/// A named partition rule for moving shared modules into their own output unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheGroup {
    pub test: Matcher,

    /// Higher wins when a module matches several groups
    #[serde(default)]
    pub priority: i32,

    /// Output unit name; `None` suppresses deterministic naming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CacheGroup {
    pub fn new(test: impl Into<Matcher>, priority: i32) -> Self {
        Self {
            test: test.into(),
            priority,
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitChunks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<ChunksMode>,

    /// Whether split chunks get generated names; `false` keeps names
    /// stable for long-term caching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<bool>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub cache_groups: IndexMap<String, CacheGroup>,
}

impl SplitChunks {
    /// The cache group a module path is assigned to.
    ///
    /// The highest priority wins; on equal priority the group declared
    /// first wins.
    pub fn cache_group_for(&self, path: &str) -> Option<(&str, &CacheGroup)> {
        let mut best: Option<(&str, &CacheGroup)> = None;
        for (name, group) in &self.cache_groups {
            if !group.test.is_match(path) {
                continue;
            }
            match best {
                Some((_, current)) if current.priority >= group.priority => {}
                _ => best = Some((name.as_str(), group)),
            }
        }
        best
    }
}

/// Code splitting, runtime chunk, module ordering and minimizers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationPolicy {
    #[serde(default)]
    pub split_chunks: SplitChunks,

    /// Emit the bundler runtime as a separate `runtime~<entry>` unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_chunk: Option<bool>,

    /// Keep module order stable so filenames stay consistent between builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_order: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub minimizer: Vec<Plugin>,
}
