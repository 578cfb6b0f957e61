//! File-path matchers used by rules, exclusions and cache groups.

use std::fmt;
use std::hash::{Hash, Hasher};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A regular expression over module paths.
///
/// Two matchers are equal when their source text is equal. That is the
/// identity the merge engine uses to decide whether an environment rule
/// overrides a base rule.
///
/// Compilation failures are not raised here. They surface as
/// [`ConfigError::MalformedPattern`] when the owning profile is validated,
/// so the error can name the profile and field.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Matcher {
    source: String,
    compiled: Option<Regex>,
}

impl Matcher {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&source).ok();
        Self { source, compiled }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// Check the pattern, attaching the profile and field it was declared at.
    pub fn check(&self, profile: &str, field: impl Into<String>) -> Result<(), ConfigError> {
        if self.compiled.is_some() {
            return Ok(());
        }
        match Regex::new(&self.source) {
            Ok(_) => Ok(()),
            Err(source) => Err(ConfigError::MalformedPattern {
                profile: profile.to_string(),
                field: field.into(),
                pattern: self.source.clone(),
                source,
            }),
        }
    }

    /// Returns false for patterns that failed to compile.
    pub fn is_match(&self, path: &str) -> bool {
        self.compiled
            .as_ref()
            .is_some_and(|regex| regex.is_match(path))
    }
}

impl From<String> for Matcher {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl From<&str> for Matcher {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<Matcher> for String {
    fn from(matcher: Matcher) -> Self {
        matcher.source
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Matcher {}

impl Hash for Matcher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Matcher({:?})", self.source)
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}
