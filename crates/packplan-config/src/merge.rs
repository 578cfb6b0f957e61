//! Merge engine: base profile + one environment profile → build plan.
//!
//! Merge rules, field by field:
//! - entries: union; the same name with a different path is a conflict
//! - output: environment values overwrite base values
//! - rules: base order; an environment rule with the same `test` replaces
//!   the base rule in place, the rest are appended
//! - plugins and minimizers: concatenated, base first; an overlay plugin
//!   identical to a base plugin is not repeated
//! - cache groups: overwritten by name, union otherwise
//!
//! Inputs are only borrowed, so a base profile can be merged with several
//! environments in one process.

use tracing::{debug, debug_span, warn};

use crate::environment::Environment;
use crate::error::{ConfigError, Result};
use crate::plan::BuildPlan;
use crate::profile::{EntryPoints, Enforce, OptimizationPolicy, Plugin, Profile, Rule};
use crate::validation::validate_named;

/// Merge `overlay` on top of `base` for the given environment.
///
/// # Example
///
/// ```
/// use packplan_config::{merge, Environment, Profile};
///
/// let base = Profile::builder("base")
///     .entry("index", "./src/index.js")
///     .output_path("dist/static")
///     .build()
///     .unwrap();
/// let dev = Profile::builder("development")
///     .filename("[name].js")
///     .build()
///     .unwrap();
///
/// let plan = merge(&base, &dev, Environment::Development).unwrap();
/// assert_eq!(plan.output().filename.to_string(), "[name].js");
/// ```
pub fn merge(base: &Profile, overlay: &Profile, mode: Environment) -> Result<BuildPlan> {
    let base_name = label(base, "base");
    let overlay_name = label(overlay, mode.as_str());

    let span = debug_span!("merge", base = %base_name, overlay = %overlay_name, %mode);
    let _guard = span.enter();

    validate_named(base, &base_name)?;
    validate_named(overlay, &overlay_name)?;

    let entry = merge_entries(&base.entry, &overlay.entry, &overlay_name)?;
    if entry.is_empty() {
        return Err(ConfigError::NoEntries);
    }

    let output = base.output.overlay(&overlay.output).resolve(&overlay_name)?;
    let rules = merge_rules(&base.rules, &overlay.rules, &overlay_name)?;

    let plugins = concat_plugins(&base.plugins, &overlay.plugins);

    let optimization = merge_optimization(&base.optimization, &overlay.optimization);

    let mut plan = BuildPlan::new(
        mode,
        entry,
        output,
        rules,
        plugins,
        optimization,
        overlay.context.clone().or_else(|| base.context.clone()),
        overlay
            .records_path
            .clone()
            .or_else(|| base.records_path.clone()),
    );

    let mut warnings = base.unresolved_references();
    warnings.extend(overlay.unresolved_references());
    warnings.extend(plan.unknown_output_units());
    for warning in &warnings {
        warn!("{warning}");
    }
    plan.set_warnings(warnings);

    debug!(
        entries = plan.entries().len(),
        rules = plan.rules().len(),
        plugins = plan.plugins().len(),
        "resolved build plan"
    );
    Ok(plan)
}

fn label(profile: &Profile, fallback: &str) -> String {
    if profile.name.is_empty() {
        fallback.to_string()
    } else {
        profile.name.clone()
    }
}

fn merge_entries(base: &EntryPoints, overlay: &EntryPoints, profile: &str) -> Result<EntryPoints> {
    let mut merged = base.clone();
    for (name, path) in overlay {
        match merged.get(name) {
            Some(existing) if existing != path => {
                return Err(ConfigError::conflict(
                    profile,
                    format!("entry.{name}"),
                    format!(
                        "entry is {} in the base profile but {} here",
                        existing.display(),
                        path.display()
                    ),
                ));
            }
            Some(_) => {}
            None => {
                merged.insert(name.clone(), path.clone());
            }
        }
    }
    Ok(merged)
}

fn merge_rules(base: &[Rule], overlay: &[Rule], profile: &str) -> Result<Vec<Rule>> {
    let mut merged = base.to_vec();
    for (index, rule) in overlay.iter().enumerate() {
        match base.iter().position(|existing| existing.test == rule.test) {
            Some(position) => {
                let existing = &base[position];
                if existing.enforce != rule.enforce {
                    return Err(ConfigError::conflict(
                        profile,
                        format!("rules[{index}].enforce"),
                        format!(
                            "overrides base rules[{position}] ({}) but changes the ordering hint from {} to {}",
                            rule.test,
                            enforce_label(existing.enforce),
                            enforce_label(rule.enforce)
                        ),
                    ));
                }
                debug!(pattern = %rule.test, position, "environment rule replaces base rule");
                merged[position] = rule.clone();
            }
            None => merged.push(rule.clone()),
        }
    }
    Ok(merged)
}

/// Base plugins, then overlay plugins not already present with identical
/// options.
fn concat_plugins(base: &[Plugin], overlay: &[Plugin]) -> Vec<Plugin> {
    let mut merged = base.to_vec();
    for plugin in overlay {
        if base.contains(plugin) {
            debug!(plugin = plugin.identifier(), "plugin already declared by base profile");
            continue;
        }
        merged.push(plugin.clone());
    }
    merged
}

fn enforce_label(enforce: Option<Enforce>) -> &'static str {
    match enforce {
        Some(Enforce::Pre) => "pre",
        Some(Enforce::Post) => "post",
        None => "normal",
    }
}

fn merge_optimization(base: &OptimizationPolicy, overlay: &OptimizationPolicy) -> OptimizationPolicy {
    let mut merged = base.clone();

    let split = &overlay.split_chunks;
    if split.chunks.is_some() {
        merged.split_chunks.chunks = split.chunks;
    }
    if split.name.is_some() {
        merged.split_chunks.name = split.name;
    }
    for (name, group) in &split.cache_groups {
        // IndexMap::insert keeps the position of an existing key
        merged
            .split_chunks
            .cache_groups
            .insert(name.clone(), group.clone());
    }

    if overlay.runtime_chunk.is_some() {
        merged.runtime_chunk = overlay.runtime_chunk;
    }
    if overlay.occurrence_order.is_some() {
        merged.occurrence_order = overlay.occurrence_order;
    }
    merged.minimizer = concat_plugins(&base.minimizer, &overlay.minimizer);

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{CacheGroup, ChunksMode, Transform};

    fn base() -> Profile {
        Profile::builder("base")
            .entry("index", "./src/index.js")
            .output_path("dist/static")
            .rule(Rule::new(r"\.css$").with(Transform::Style))
            .rule(Rule::new(r"\.txt$").with(Transform::Raw))
            .chunks(ChunksMode::All)
            .cache_group(
                "vendors",
                CacheGroup::new(r"[\\/]node_modules[\\/]", -10).named("vendors"),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn overlay_rule_with_same_test_replaces_in_place() {
        let env = Profile::builder("production")
            .filename("[name].[contenthash].js")
            .rule(Rule::new(r"\.css$").with(Transform::ExtractCss))
            .build()
            .unwrap();

        let plan = merge(&base(), &env, Environment::Production).unwrap();
        assert_eq!(plan.rules().len(), 2);
        assert_eq!(plan.rules()[0].transforms, vec![Transform::ExtractCss]);
        assert_eq!(plan.rules()[1].transforms, vec![Transform::Raw]);
    }

    #[test]
    fn changing_enforce_on_override_conflicts() {
        let env = Profile::builder("production")
            .filename("[name].js")
            .rule(
                Rule::new(r"\.txt$")
                    .with(Transform::Raw)
                    .enforce(Enforce::Pre),
            )
            .build()
            .unwrap();

        match merge(&base(), &env, Environment::Production).unwrap_err() {
            ConfigError::ConfigurationConflict { profile, field, .. } => {
                assert_eq!(profile, "production");
                assert_eq!(field, "rules[0].enforce");
            }
            other => panic!("expected ConfigurationConflict, got {other:?}"),
        }
    }

    #[test]
    fn cache_groups_overwrite_by_name_and_keep_position() {
        let env = Profile::builder("production")
            .filename("[name].js")
            .cache_group("react", CacheGroup::new("react", 10).named("react"))
            .cache_group("vendors", CacheGroup::new("node_modules", -5))
            .chunks(ChunksMode::Async)
            .build()
            .unwrap();

        let plan = merge(&base(), &env, Environment::Production).unwrap();
        let groups = &plan.optimization().split_chunks.cache_groups;
        let names: Vec<_> = groups.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["vendors", "react"]);
        assert_eq!(groups["vendors"].priority, -5);
        assert_eq!(groups["vendors"].name, None);
        assert_eq!(
            plan.optimization().split_chunks.chunks,
            Some(ChunksMode::Async)
        );
    }

    #[test]
    fn unnamed_overlay_uses_environment_label() {
        let env = Profile::default();
        match merge(&base(), &env, Environment::Development).unwrap_err() {
            ConfigError::Unresolved { profile, field } => {
                assert_eq!(profile, "development");
                assert_eq!(field, "output.filename");
            }
            other => panic!("expected Unresolved, got {other:?}"),
        }
    }

    #[test]
    fn plan_without_entries_is_rejected() {
        let base = Profile::builder("base").output_path("dist").build().unwrap();
        let env = Profile::builder("development")
            .filename("[name].js")
            .build()
            .unwrap();
        assert!(matches!(
            merge(&base, &env, Environment::Development),
            Err(ConfigError::NoEntries)
        ));
    }

    #[test]
    fn unnamed_base_errors_use_base_label() {
        let base = Profile {
            rules: vec![Rule::new(r"\.(css").with(Transform::Style)],
            ..Default::default()
        };
        let env = Profile::builder("production")
            .filename("[name].js")
            .build()
            .unwrap();

        match merge(&base, &env, Environment::Production).unwrap_err() {
            ConfigError::MalformedPattern { profile, field, .. } => {
                assert_eq!(profile, "base");
                assert_eq!(field, "rules[0].test");
            }
            other => panic!("expected MalformedPattern, got {other:?}"),
        }
    }

    #[test]
    fn unnamed_overlay_errors_use_environment_label() {
        let env = Profile {
            rules: vec![
                Rule::new(r"\.md$").with(Transform::Raw),
                Rule::new(r"\.md$").with(Transform::Style),
            ],
            ..Default::default()
        };

        match merge(&base(), &env, Environment::Development).unwrap_err() {
            ConfigError::ConfigurationConflict { profile, field, .. } => {
                assert_eq!(profile, "development");
                assert_eq!(field, "rules[1].test");
            }
            other => panic!("expected ConfigurationConflict, got {other:?}"),
        }
    }

    #[test]
    fn identical_plugins_are_not_repeated() {
        let base = Profile::builder("base")
            .entry("index", "./src/index.js")
            .output_path("dist")
            .plugin(Plugin::HashedModuleIds)
            .build()
            .unwrap();
        let env = Profile::builder("production")
            .filename("[name].js")
            .plugin(Plugin::HashedModuleIds)
            .plugin(Plugin::NamedModules)
            .build()
            .unwrap();

        let plan = merge(&base, &env, Environment::Production).unwrap();
        assert_eq!(plan.plugins(), &[Plugin::HashedModuleIds, Plugin::NamedModules]);
    }
}
