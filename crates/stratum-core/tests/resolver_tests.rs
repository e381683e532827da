//! Registry and resolver behaviour: lookup, bundle expansion, dedup,
//! version selection and capability cardinality.

mod common;

use common::*;
use stratum_core::application::plugin::Plugin;
use stratum_core::application::{CapabilityRequirement, Registry, ResolvedSet, Resolver};
use stratum_core::domain::{Capability::*, DomainError, Operation};
use stratum_core::error::StratumError;

fn keys(set: &ResolvedSet) -> Vec<String> {
    set.keys().iter().map(ToString::to_string).collect()
}

fn domain_err(err: StratumError) -> DomainError {
    match err {
        StratumError::Domain(e) => e,
        other => panic!("expected domain error, got {other:?}"),
    }
}

fn nested_registry() -> Registry {
    registry(
        vec![
            TestPlugin::new("a/v1", &[Initializer]),
            TestPlugin::new("b/v1", &[ApiCreator]),
            TestPlugin::new("c/v1", &[ApiCreator]),
            TestPlugin::new("d/v1", &[Editor]),
        ],
        vec![
            bundle("inner/v1", &["c/v1", "d/v1"]),
            bundle("outer/v1", &["a/v1", "inner/v1", "b/v1"]),
        ],
    )
}

#[test]
fn bundles_expand_depth_first_in_member_order() {
    let registry = nested_registry();
    let resolver = Resolver::new(&registry);

    let first = resolver.resolve(&["outer/v1"], &v3(), None).unwrap();
    let second = resolver.resolve(&["outer/v1"], &v3(), None).unwrap();

    assert_eq!(keys(&first), ["a/v1", "c/v1", "d/v1", "b/v1"]);
    assert_eq!(keys(&first), keys(&second));
}

#[test]
fn duplicates_keep_first_occurrence() {
    let registry = nested_registry();
    let resolver = Resolver::new(&registry);

    let set = resolver
        .resolve(&["d/v1", "outer/v1", "inner/v1", "a/v1"], &v3(), None)
        .unwrap();

    assert_eq!(keys(&set), ["d/v1", "a/v1", "c/v1", "b/v1"]);
}

#[test]
fn omitted_version_selects_newest_non_deprecated() {
    let registry = registry(
        vec![
            TestPlugin::new("x.stratum.dev/v1", &[Initializer]),
            TestPlugin::new("x.stratum.dev/v2-alpha", &[Initializer]),
            TestPlugin::new("x.stratum.dev/v2", &[Initializer]).deprecated("use v2-alpha"),
        ],
        vec![],
    );
    let resolver = Resolver::new(&registry);

    assert_eq!(
        resolver.resolve_key("x.stratum.dev", &v3()).unwrap(),
        key("x.stratum.dev/v2-alpha")
    );
    assert_eq!(
        resolver.resolve_key("x", &v3()).unwrap(),
        key("x.stratum.dev/v2-alpha")
    );
}

#[test]
fn deprecated_only_is_not_found_unless_explicit() {
    let registry = registry(
        vec![TestPlugin::new("old/v1", &[Initializer]).deprecated("gone")],
        vec![],
    );
    let resolver = Resolver::new(&registry);

    let err = resolver.resolve(&["old"], &v3(), None).unwrap_err();
    assert!(matches!(domain_err(err), DomainError::NotFound { .. }));

    let set = resolver.resolve(&["old/v1"], &v3(), None).unwrap();
    assert_eq!(keys(&set), ["old/v1"]);
}

#[test]
fn unknown_name_and_version_are_not_found() {
    let registry = nested_registry();
    let resolver = Resolver::new(&registry);

    for request in ["zzz", "a/v9"] {
        let err = resolver.resolve(&[request], &v3(), None).unwrap_err();
        assert!(matches!(domain_err(err), DomainError::NotFound { .. }), "{request}");
    }
}

#[test]
fn short_name_shared_by_two_plugins_is_ambiguous() {
    let registry = registry(
        vec![
            TestPlugin::new("go.alpha.io/v1", &[Initializer]),
            TestPlugin::new("go.beta.io/v1", &[Initializer]),
        ],
        vec![],
    );
    let err = Resolver::new(&registry)
        .resolve(&["go"], &v3(), None)
        .unwrap_err();

    match domain_err(err) {
        DomainError::AmbiguousPlugin { candidates, .. } => {
            assert_eq!(candidates, ["go.alpha.io", "go.beta.io"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn exact_full_name_wins_over_shared_short_name() {
    let registry = registry(
        vec![
            TestPlugin::new("go/v1", &[Initializer]),
            TestPlugin::new("go.alpha.io/v2", &[Initializer]),
        ],
        vec![],
    );
    let resolver = Resolver::new(&registry);

    assert_eq!(resolver.resolve_key("go", &v3()).unwrap(), key("go/v1"));
    assert_eq!(
        resolver.resolve_key("go.alpha.io", &v3()).unwrap(),
        key("go.alpha.io/v2")
    );
}

#[test]
fn unsupported_project_version_fails() {
    let registry = registry(
        vec![TestPlugin::new("legacy/v1", &[Initializer]).versions(&["2"])],
        vec![bundle("wrap/v1", &["legacy/v1"])],
    );
    let resolver = Resolver::new(&registry);

    let err = resolver.resolve(&["legacy/v1"], &v3(), None).unwrap_err();
    match domain_err(err) {
        DomainError::UnsupportedVersion {
            plugin, supported, ..
        } => {
            assert_eq!(plugin, "legacy/v1");
            assert_eq!(supported, ["2"]);
        }
        other => panic!("unexpected {other:?}"),
    }

    let err = resolver.resolve(&["wrap/v1"], &v3(), None).unwrap_err();
    assert!(matches!(domain_err(err), DomainError::UnsupportedVersion { .. }));

    let err = resolver.resolve(&["legacy"], &v3(), None).unwrap_err();
    assert!(matches!(domain_err(err), DomainError::NotFound { .. }));
}

#[test]
fn two_initializers_are_a_duplicate_capability() {
    let registry = registry(
        vec![
            TestPlugin::new("one/v1", &[Initializer]),
            TestPlugin::new("two/v1", &[Initializer, ApiCreator]),
        ],
        vec![],
    );
    let err = Resolver::new(&registry)
        .resolve(
            &["one/v1", "two/v1"],
            &v3(),
            Some(CapabilityRequirement::from(Operation::Init)),
        )
        .unwrap_err();

    match domain_err(err) {
        DomainError::DuplicateCapability { first, second, .. } => {
            assert_eq!(first, "one/v1");
            assert_eq!(second, "two/v1");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn missing_capability_fails() {
    let registry = nested_registry();
    let err = Resolver::new(&registry)
        .resolve(&["b/v1"], &v3(), Some(Operation::Init.into()))
        .unwrap_err();

    assert!(matches!(
        domain_err(err),
        DomainError::MissingCapability {
            capability: Initializer,
            ..
        }
    ));
}

#[test]
fn create_api_accepts_several_providers() {
    let registry = nested_registry();
    let set = Resolver::new(&registry)
        .resolve(&["outer/v1"], &v3(), Some(Operation::CreateApi.into()))
        .unwrap();

    let providers: Vec<String> = set
        .providers(ApiCreator)
        .map(|p| p.key().to_string())
        .collect();
    assert_eq!(providers, ["c/v1", "b/v1"]);
}

#[test]
fn registration_rejects_duplicates_and_cycles() {
    let mut builder = Registry::builder();
    builder
        .register_plugin(TestPlugin::new("a/v1", &[Initializer]))
        .unwrap();

    let err = builder
        .register_plugin(TestPlugin::new("a/v1", &[Editor]))
        .unwrap_err();
    assert!(matches!(domain_err(err), DomainError::DuplicateKey { .. }));

    builder.register_bundle(bundle("x/v1", &["y/v1"])).unwrap();
    builder.register_bundle(bundle("y/v1", &["z/v1"])).unwrap();
    let err = builder
        .register_bundle(bundle("z/v1", &["a/v1", "x/v1"]))
        .unwrap_err();
    match domain_err(err) {
        DomainError::CyclicBundle { bundle, cycle } => {
            assert_eq!(bundle, "z/v1");
            assert_eq!(cycle, ["z/v1", "x/v1", "y/v1", "z/v1"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn build_rejects_dangling_bundle_member() {
    let mut builder = Registry::builder();
    builder.register_bundle(bundle("b/v1", &["ghost/v1"])).unwrap();

    let err = builder.build().unwrap_err();
    assert!(matches!(domain_err(err), DomainError::NotFound { key, .. } if key == "ghost/v1"));
}

#[test]
fn all_keys_lists_supported_non_deprecated_entries() {
    let registry = registry(
        vec![
            TestPlugin::new("a/v1", &[Initializer]),
            TestPlugin::new("a/v2", &[Initializer]).versions(&["3", "4"]),
            TestPlugin::new("old/v1", &[Editor]).deprecated("gone"),
            TestPlugin::new("next/v1", &[Editor]).versions(&["4"]),
        ],
        vec![
            bundle("mixed/v1", &["a/v1", "next/v1"]),
            bundle("ok/v1", &["a/v1", "a/v2"]),
        ],
    );

    let listed: Vec<String> = registry
        .all_keys(&v3())
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(listed, ["a/v1", "a/v2", "ok/v1"]);

    assert!(registry.supports(&key("ok/v1"), &v3()));
    assert!(!registry.supports(&key("mixed/v1"), &v3()));
    assert!(!registry.supports(&key("missing/v1"), &v3()));

    let versions: Vec<String> = registry
        .project_versions()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(versions, ["3", "4"]);
}

#[test]
fn lookup_unknown_key_is_not_found() {
    let registry = nested_registry();
    assert!(registry.lookup(&key("a/v1")).is_ok());
    let err = registry.lookup(&key("nope/v1")).unwrap_err();
    assert!(matches!(domain_err(err), DomainError::NotFound { .. }));
}
