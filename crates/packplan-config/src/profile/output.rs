//! Output location and filename templates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::template::FilenameTemplate;

/// Output layout as declared by a profile.
///
/// Every field is optional so a base profile can leave values for an
/// environment profile to supply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    /// Directory all assets are written to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// URL prefix used to rewrite asset references (include the leading `/`
    /// for server-relative URLs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<FilenameTemplate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_filename: Option<FilenameTemplate>,
}

impl OutputSpec {
    /// Field-wise overlay: values present in `overlay` win.
    pub fn overlay(&self, overlay: &OutputSpec) -> OutputSpec {
        OutputSpec {
            path: overlay.path.clone().or_else(|| self.path.clone()),
            public_path: overlay
                .public_path
                .clone()
                .or_else(|| self.public_path.clone()),
            filename: overlay.filename.clone().or_else(|| self.filename.clone()),
            chunk_filename: overlay
                .chunk_filename
                .clone()
                .or_else(|| self.chunk_filename.clone()),
        }
    }

    /// Resolve into the form the bundler consumes.
    ///
    /// `profile` names the environment profile that was expected to supply
    /// any deferred value.
    pub fn resolve(&self, profile: &str) -> Result<ResolvedOutput> {
        let unresolved = |field: &str| ConfigError::Unresolved {
            profile: profile.to_string(),
            field: field.to_string(),
        };

        let path = self.path.clone().ok_or_else(|| unresolved("output.path"))?;
        let filename = self
            .filename
            .clone()
            .ok_or_else(|| unresolved("output.filename"))?;
        let chunk_filename = self
            .chunk_filename
            .clone()
            .unwrap_or_else(|| filename.clone());

        Ok(ResolvedOutput {
            path,
            public_path: self.public_path.clone().unwrap_or_default(),
            filename,
            chunk_filename,
        })
    }
}

/// Output layout with every value present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOutput {
    pub path: PathBuf,
    pub public_path: String,
    pub filename: FilenameTemplate,
    pub chunk_filename: FilenameTemplate,
}
