//! Module rules: which files a transform chain applies to.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::pattern::Matcher;
use crate::profile::helpers::one_or_many;
use crate::profile::transform::Transform;

/// Ordering hint that moves a rule out of the normal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Enforce {
    /// Apply before normal rules
    Pre,
    /// Apply after normal rules
    Post,
}

/// Application phase of a rule; rules sort by phase, then declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Pre,
    Normal,
    Post,
}

/// A file-type matcher bound to an ordered transform chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub test: Matcher,

    #[serde(rename = "use", deserialize_with = "one_or_many")]
    pub transforms: Vec<Transform>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Matcher>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce: Option<Enforce>,
}

impl Rule {
    pub fn new(test: impl Into<Matcher>) -> Self {
        Self {
            test: test.into(),
            transforms: Vec::new(),
            exclude: None,
            enforce: None,
        }
    }

    pub fn with(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn exclude(mut self, pattern: impl Into<Matcher>) -> Self {
        self.exclude = Some(pattern.into());
        self
    }

    pub fn enforce(mut self, enforce: Enforce) -> Self {
        self.enforce = Some(enforce);
        self
    }

    pub fn phase(&self) -> Phase {
        match self.enforce {
            Some(Enforce::Pre) => Phase::Pre,
            None => Phase::Normal,
            Some(Enforce::Post) => Phase::Post,
        }
    }

    /// True when the path matches `test` and is not excluded.
    pub fn applies_to(&self, path: &str) -> bool {
        self.test.is_match(path)
            && !self
                .exclude
                .as_ref()
                .is_some_and(|exclude| exclude.is_match(path))
    }

    /// Check patterns and the transform chain of a rule declared at `index`.
    pub(crate) fn validate(&self, profile: &str, index: usize) -> Result<()> {
        let field = format!("rules[{index}]");

        self.test.check(profile, format!("{field}.test"))?;
        if let Some(exclude) = &self.exclude {
            exclude.check(profile, format!("{field}.exclude"))?;
        }

        if self.transforms.is_empty() {
            return Err(ConfigError::SchemaValidation {
                message: format!(
                    "{field} in profile '{profile}' ({}) has no transforms",
                    self.test
                ),
                hint: Some("Add at least one loader to `use`".to_string()),
            });
        }

        for (position, transform) in self.transforms.iter().enumerate() {
            if let Transform::External { loader, .. } = transform {
                if loader.trim().is_empty() || loader.chars().any(char::is_whitespace) {
                    return Err(ConfigError::invalid_value(
                        format!("{field}.use[{position}]"),
                        format!("`{loader}` is not a well-formed loader identifier"),
                    ));
                }
            }

            // importLoaders counts the loaders that run before css-loader,
            // which are the ones declared after it in the chain
            if let Transform::Css(opts) = transform {
                let after = self.transforms.len() - position - 1;
                if usize::from(opts.import_loaders) > after {
                    return Err(ConfigError::invalid_value(
                        format!("{field}.use[{position}].options.importLoaders"),
                        format!(
                            "importLoaders is {} but only {after} loader(s) follow css-loader",
                            opts.import_loaders
                        ),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Rules that apply to `path`, in application order.
pub fn applicable<'a>(rules: &'a [Rule], path: &str) -> Vec<&'a Rule> {
    let mut matched: Vec<&Rule> = rules.iter().filter(|rule| rule.applies_to(path)).collect();
    // stable sort keeps declaration order within a phase
    matched.sort_by_key(|rule| rule.phase());
    matched
}
