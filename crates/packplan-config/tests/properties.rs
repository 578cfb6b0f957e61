//! Property-based tests for the merge engine using proptest.

use packplan_config::{merge, CacheGroup, Environment, Profile, Rule, Transform};
use proptest::prelude::*;

const PATTERNS: &[&str] = &[
    r"\.css$",
    r"\.txt$",
    r"\.md$",
    r"\.(js|jsx)$",
    r"\.svg$",
    r"\.(woff|woff2)$",
    r"\.json$",
    r"\.html$",
];

fn transform_strategy() -> impl Strategy<Value = Transform> {
    prop_oneof![
        Just(Transform::Raw),
        Just(Transform::Style),
        Just(Transform::PostCss),
        Just(Transform::ExtractCss),
        "[a-z]{3,8}-loader".prop_map(Transform::external),
    ]
}

/// Rules over a subset of the pattern pool; at most one rule per pattern.
fn rules_strategy() -> impl Strategy<Value = Vec<Rule>> {
    prop::sample::subsequence(PATTERNS.to_vec(), 0..=PATTERNS.len())
        .prop_flat_map(|patterns| {
            let count = patterns.len();
            (
                Just(patterns),
                prop::collection::vec(prop::collection::vec(transform_strategy(), 1..=3), count),
            )
        })
        .prop_map(|(patterns, chains)| {
            patterns
                .into_iter()
                .zip(chains)
                .map(|(pattern, chain)| {
                    chain
                        .into_iter()
                        .fold(Rule::new(pattern), |rule, transform| rule.with(transform))
                })
                .collect::<Vec<_>>()
        })
}

fn profiles_strategy() -> impl Strategy<Value = (Profile, Profile)> {
    (
        rules_strategy(),
        rules_strategy(),
        prop::collection::btree_set("[a-z]{1,6}", 1..=4),
        prop::bool::ANY,
    )
        .prop_map(|(base_rules, env_rules, entries, runtime)| {
            let mut base = Profile::builder("base")
                .output_path("dist/static")
                .runtime_chunk(runtime);
            for name in &entries {
                base = base.entry(name.as_str(), format!("./src/{name}.js"));
            }
            let base = base_rules
                .into_iter()
                .fold(base, |profile, rule| profile.rule(rule))
                .build()
                .expect("generated base profile");

            let env = env_rules
                .into_iter()
                .fold(
                    Profile::builder("production")
                        .entry("blog-page", "./src/pages/blog.js")
                        .filename("[name].[contenthash].js"),
                    |profile, rule| profile.rule(rule),
                )
                .build()
                .expect("generated environment profile");
            (base, env)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Merging the same inputs twice serializes to identical bytes
    #[test]
    fn prop_merge_is_deterministic((base, env) in profiles_strategy()) {
        let first = merge(&base, &env, Environment::Production).unwrap();
        let second = merge(&base, &env, Environment::Production).unwrap();
        prop_assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    /// Inputs are unchanged after merging
    #[test]
    fn prop_merge_does_not_mutate((base, env) in profiles_strategy()) {
        let base_before = base.clone();
        let env_before = env.clone();
        let _ = merge(&base, &env, Environment::Production).unwrap();
        prop_assert_eq!(&base, &base_before);
        prop_assert_eq!(&env, &env_before);
    }

    /// Every base pattern keeps its position; environment rules win on
    /// shared patterns and the rest are appended in order
    #[test]
    fn prop_override_by_matcher((base, env) in profiles_strategy()) {
        let plan = merge(&base, &env, Environment::Production).unwrap();
        let rules = plan.rules();

        for (position, base_rule) in base.rules.iter().enumerate() {
            prop_assert_eq!(&rules[position].test, &base_rule.test);
            let expected = env
                .rules
                .iter()
                .find(|rule| rule.test == base_rule.test)
                .unwrap_or(base_rule);
            prop_assert_eq!(&rules[position].transforms, &expected.transforms);
        }

        let appended: Vec<_> = env
            .rules
            .iter()
            .filter(|rule| !base.rules.iter().any(|b| b.test == rule.test))
            .collect();
        prop_assert_eq!(rules.len(), base.rules.len() + appended.len());
        for (offset, rule) in appended.into_iter().enumerate() {
            prop_assert_eq!(&rules[base.rules.len() + offset], rule);
        }
    }

    /// Entries from both profiles are present
    #[test]
    fn prop_entries_are_unioned((base, env) in profiles_strategy()) {
        let plan = merge(&base, &env, Environment::Production).unwrap();
        for name in base.entry.keys().chain(env.entry.keys()) {
            prop_assert!(plan.entries().contains_key(name));
        }
    }

    /// A module matching two cache groups goes to the higher priority one
    #[test]
    fn prop_higher_priority_group_wins(low in -50i32..0, high in 0i32..50) {
        let base = Profile::builder("base")
            .entry("index", "./src/index.js")
            .output_path("dist")
            .cache_group("vendors", CacheGroup::new("node_modules", low).named("vendors"))
            .build()
            .unwrap();
        let env = Profile::builder("production")
            .filename("[name].js")
            .cache_group("react", CacheGroup::new("node_modules/react", high).named("react"))
            .build()
            .unwrap();

        let plan = merge(&base, &env, Environment::Production).unwrap();
        let (name, _) = plan.cache_group_for("node_modules/react/index.js").unwrap();
        prop_assert_eq!(name, "react");
    }
}
