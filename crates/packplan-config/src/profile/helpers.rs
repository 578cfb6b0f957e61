//! Serde helpers and defaults shared by the profile types.

use serde::{Deserialize, Deserializer};

/// Size below which asset loaders inline files as data URLs (10 KiB).
pub const DEFAULT_INLINE_LIMIT: u64 = 10 * 1024;

// Helper defaults
pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_manifest_filename() -> String {
    "manifest.json".to_string()
}

pub(crate) fn default_html_filename() -> String {
    "index.html".to_string()
}

pub(crate) fn default_css_processor() -> String {
    "cssnano".to_string()
}

/// Accept either a single value or a list, as bundler configs do for `use`.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        One(T),
        Many(Vec<T>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(item) => vec![item],
        OneOrMany::Many(items) => items,
    })
}
