//! Merge engine behavior: overrides, unions, conflicts and determinism.

use packplan_config::{
    merge, CacheGroup, ConfigError, Environment, Profile, Rule, Transform,
};

fn base() -> Profile {
    Profile::builder("base")
        .entry("index", "./src/index.js")
        .output_path("dist/static")
        .rule(Rule::new(r"\.(js|jsx)$").with(Transform::external("swc-loader")))
        .rule(Rule::new(r"\.css$").with(Transform::Style))
        .rule(Rule::new(r"\.txt$").with(Transform::Raw))
        .cache_group(
            "vendors",
            CacheGroup::new(r"[\\/]node_modules[\\/]", -10).named("vendors"),
        )
        .build()
        .expect("base profile")
}

fn env(name: &str) -> Profile {
    Profile::builder(name)
        .filename("[name].[contenthash].js")
        .build()
        .expect("environment profile")
}

#[test]
fn override_by_matcher_keeps_base_position() {
    let production = Profile::builder("production")
        .filename("[name].[contenthash].js")
        .rule(Rule::new(r"\.css$").with(Transform::ExtractCss))
        .build()
        .expect("production profile");

    let plan = merge(&base(), &production, Environment::Production).expect("merge");

    let css: Vec<_> = plan
        .rules()
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.test.as_str() == r"\.css$")
        .collect();
    assert_eq!(css.len(), 1);
    let (position, rule) = css[0];
    assert_eq!(position, 1);
    assert_eq!(rule.transforms, vec![Transform::ExtractCss]);
    assert_eq!(plan.rules().len(), 3);
}

#[test]
fn environment_only_rules_are_appended() {
    let production = Profile::builder("production")
        .filename("[name].js")
        .rule(Rule::new(r"\.md$").with(Transform::Raw))
        .build()
        .expect("production profile");

    let plan = merge(&base(), &production, Environment::Production).expect("merge");
    let patterns: Vec<_> = plan.rules().iter().map(|rule| rule.test.as_str()).collect();
    assert_eq!(patterns, vec![r"\.(js|jsx)$", r"\.css$", r"\.txt$", r"\.md$"]);
}

#[test]
fn entry_points_are_unioned() {
    let development = Profile::builder("development")
        .entry("blog", "./src/pages/Blog/blog.js")
        .filename("[name].js")
        .build()
        .expect("development profile");

    let plan = merge(&base(), &development, Environment::Development).expect("merge");
    let entries = plan.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries["index"].to_str(), Some("./src/index.js"));
    assert_eq!(entries["blog"].to_str(), Some("./src/pages/Blog/blog.js"));
}

#[test]
fn same_entry_with_same_path_is_not_a_conflict() {
    let development = Profile::builder("development")
        .entry("index", "./src/index.js")
        .filename("[name].js")
        .build()
        .expect("development profile");

    let plan = merge(&base(), &development, Environment::Development).expect("merge");
    assert_eq!(plan.entries().len(), 1);
}

#[test]
fn conflicting_entry_paths_are_rejected() {
    let base = Profile::builder("base")
        .entry("index", "./a.js")
        .output_path("dist")
        .build()
        .expect("base profile");
    let development = Profile::builder("development")
        .entry("index", "./b.js")
        .filename("[name].js")
        .build()
        .expect("development profile");

    match merge(&base, &development, Environment::Development) {
        Err(ConfigError::ConfigurationConflict { profile, field, .. }) => {
            assert_eq!(profile, "development");
            assert_eq!(field, "entry.index");
        }
        other => panic!("expected ConfigurationConflict, got {other:?}"),
    }
}

#[test]
fn merge_is_deterministic() {
    let base = base();
    let production = env("production");

    let first = merge(&base, &production, Environment::Production)
        .expect("first merge")
        .to_json()
        .expect("serialize");
    let second = merge(&base, &production, Environment::Production)
        .expect("second merge")
        .to_json()
        .expect("serialize");
    assert_eq!(first, second);
}

#[test]
fn merge_does_not_mutate_inputs() {
    let base = base();
    let snapshot = base.clone();
    let production = Profile::builder("production")
        .filename("[name].js")
        .rule(Rule::new(r"\.css$").with(Transform::ExtractCss))
        .rule(Rule::new(r"\.md$").with(Transform::Raw))
        .build()
        .expect("production profile");

    merge(&base, &production, Environment::Production).expect("production merge");
    merge(&base, &env("development"), Environment::Development).expect("development merge");

    assert_eq!(base.rules.len(), snapshot.rules.len());
    assert_eq!(base, snapshot);
}

#[test]
fn higher_priority_cache_group_wins() {
    let production = Profile::builder("production")
        .filename("[name].js")
        .cache_group(
            "react",
            CacheGroup::new(r"[\\/]node_modules[\\/]react", 0).named("react"),
        )
        .build()
        .expect("production profile");

    let plan = merge(&base(), &production, Environment::Production).expect("merge");

    let (name, group) = plan
        .cache_group_for("./node_modules/react/index.js")
        .expect("react group");
    assert_eq!(name, "react");
    assert_eq!(group.priority, 0);

    let (name, _) = plan
        .cache_group_for("./node_modules/lodash/map.js")
        .expect("vendors group");
    assert_eq!(name, "vendors");

    assert!(plan.cache_group_for("./src/index.js").is_none());
}

#[test]
fn plugins_and_minimizers_concatenate_base_first() {
    use packplan_config::{CssMinifyOptions, MinifyOptions, Plugin};

    let base = Profile::builder("base")
        .entry("index", "./src/index.js")
        .output_path("dist")
        .plugin(Plugin::HashedModuleIds)
        .minimizer(Plugin::Terser(MinifyOptions::default()))
        .build()
        .expect("base profile");
    let production = Profile::builder("production")
        .filename("[name].js")
        .plugin(Plugin::NamedModules)
        .minimizer(Plugin::OptimizeCssAssets(CssMinifyOptions::default()))
        .build()
        .expect("production profile");

    let plan = merge(&base, &production, Environment::Production).expect("merge");
    assert_eq!(plan.plugins(), &[Plugin::HashedModuleIds, Plugin::NamedModules]);
    let minimizers: Vec<_> = plan
        .optimization()
        .minimizer
        .iter()
        .map(Plugin::identifier)
        .collect();
    assert_eq!(minimizers.len(), 2);
    assert_eq!(minimizers[0], Plugin::TERSER);
}

#[test]
fn external_identifiers_become_warnings() {
    let plan = merge(&base(), &env("production"), Environment::Production).expect("merge");
    assert_eq!(plan.warnings().len(), 1);
    assert!(plan.warnings()[0].to_string().contains("swc-loader"));
}

#[test]
fn missing_filename_is_unresolved() {
    let development = Profile::builder("development")
        .public_path("/static/")
        .build()
        .expect("development profile");

    match merge(&base(), &development, Environment::Development) {
        Err(ConfigError::Unresolved { profile, field }) => {
            assert_eq!(profile, "development");
            assert_eq!(field, "output.filename");
        }
        other => panic!("expected Unresolved, got {other:?}"),
    }
}

#[test]
fn chunk_filename_defaults_to_filename() {
    let plan = merge(&base(), &env("production"), Environment::Production).expect("merge");
    assert_eq!(plan.output().chunk_filename, plan.output().filename);
    assert_eq!(plan.output().public_path, "");
}
