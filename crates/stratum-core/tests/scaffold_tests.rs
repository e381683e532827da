//! End-to-end runs of the scaffold engine against in-memory adapters.

mod common;

use std::path::{Path, PathBuf};

use common::*;
use mockall::mock;
use stratum_core::application::ports::{Filesystem, WriteMode};
use stratum_core::application::{
    ApplicationError, ExecuteRequest, ExecutionReport, ScaffoldService,
};
use stratum_core::domain::{
    AnchorPatch, Capability::*, DomainError, ExistsPolicy, Operation, Phase, RawFlags,
    RelativePath, Resource, Template, Webhooks,
};
use stratum_core::error::{StratumError, StratumResult};

mock! {
    pub Fs {}

    impl Filesystem for Fs {
        fn exists(&self, path: &Path) -> bool;
        fn read_file(&self, path: &Path) -> StratumResult<String>;
        fn write_file(&self, path: &Path, content: &str, mode: WriteMode) -> StratumResult<()>;
        fn create_dir_all(&self, path: &Path) -> StratumResult<()>;
    }
}

fn init(plugins: &[&str]) -> ExecuteRequest {
    ExecuteRequest::new(Operation::Init, v3()).with_plugins(plugins.iter().copied())
}

fn create_api(plugins: &[&str]) -> ExecuteRequest {
    ExecuteRequest::new(Operation::CreateApi, v3())
        .with_plugins(plugins.iter().copied())
        .with_resource(Resource::new("batch", "v1", "CronJob"))
}

/// `(plugin, phase, innermost error)` of a failed report.
fn phase_failure(report: &ExecutionReport) -> (String, Phase, StratumError) {
    let err = report.error.as_ref().expect("run should have failed");
    match err {
        StratumError::Application(ApplicationError::PhaseFailed { plugin, phase, .. }) => {
            (plugin.clone(), *phase, err.innermost().clone())
        }
        other => panic!("expected a phase failure, got {other:?}"),
    }
}

fn paths(report: &ExecutionReport) -> Vec<PathBuf> {
    report.written_paths.clone()
}

#[test]
fn bundle_init_runs_only_the_initializer() {
    let log = new_log();
    let registry = registry(
        vec![
            TestPlugin::new("A/v1", &[Initializer])
                .template(Template::new("a.txt", "from A"))
                .log(&log),
            TestPlugin::new("C/v1", &[ApiCreator])
                .template(Template::new("c.txt", "from C"))
                .log(&log),
        ],
        vec![bundle("B/v1", &["A/v1", "C/v1"])],
    );
    let fs = MemFs::new();
    let mut config = MemConfig::new();

    let report = ScaffoldService::new(&registry).execute(init(&["B/v1"]), &fs, &mut config);

    assert!(report.is_success(), "{:?}", report.error);
    assert_eq!(report.resolved, [key("A/v1"), key("C/v1")]);
    assert_eq!(paths(&report), [PathBuf::from("a.txt")]);
    assert_eq!(fs.paths(), ["a.txt"]);
    assert!(entries(&log).iter().all(|e| e.starts_with("A/v1:")));
    assert_eq!(config.layout, [key("A/v1"), key("C/v1")]);
}

#[test]
fn append_twice_concatenates_body() {
    let registry = registry(
        vec![TestPlugin::new("p/v1", &[Initializer])
            .template(Template::new("notes.txt", "line\n").with_policy(ExistsPolicy::Append))],
        vec![],
    );
    let service = ScaffoldService::new(&registry);
    let fs = MemFs::new();

    for _ in 0..2 {
        let report = service.execute(init(&["p/v1"]), &fs, &mut MemConfig::new());
        assert!(report.is_success());
    }

    assert_eq!(fs.content("notes.txt").unwrap(), "line\nline\n");
}

#[test]
fn skip_leaves_existing_file_untouched() {
    let registry = registry(
        vec![TestPlugin::new("p/v1", &[Initializer])
            .template(Template::new("keep.txt", "new").with_policy(ExistsPolicy::Skip))],
        vec![],
    );
    let fs = MemFs::new().with_file("keep.txt", "original");

    let report = ScaffoldService::new(&registry).execute(init(&["p/v1"]), &fs, &mut MemConfig::new());

    assert!(report.is_success());
    assert!(report.written_paths.is_empty());
    assert_eq!(fs.content("keep.txt").unwrap(), "original");
}

#[test]
fn overwrite_replaces_existing_file() {
    let registry = registry(
        vec![TestPlugin::new("p/v1", &[Initializer]).template(
            Template::new("gen.txt", "fresh").with_policy(ExistsPolicy::Overwrite),
        )],
        vec![],
    );
    let fs = MemFs::new().with_file("gen.txt", "stale");

    let report = ScaffoldService::new(&registry).execute(init(&["p/v1"]), &fs, &mut MemConfig::new());

    assert!(report.is_success());
    assert_eq!(fs.content("gen.txt").unwrap(), "fresh");
}

#[test]
fn error_policy_aborts_and_keeps_earlier_writes() {
    let registry = registry(
        vec![TestPlugin::new("p/v1", &[Initializer])
            .template(Template::new("first.txt", "1"))
            .template(Template::new("conflict.txt", "2"))
            .template(Template::new("never.txt", "3"))],
        vec![],
    );
    let fs = MemFs::new().with_file("conflict.txt", "mine");
    let mut config = MemConfig::new();

    let report = ScaffoldService::new(&registry).execute(init(&["p/v1"]), &fs, &mut config);

    let (plugin, phase, inner) = phase_failure(&report);
    assert_eq!(plugin, "p/v1");
    assert_eq!(phase, Phase::Scaffold);
    assert!(matches!(
        inner,
        StratumError::Application(ApplicationError::FileExists { path }) if path == Path::new("conflict.txt")
    ));
    assert_eq!(fs.content("conflict.txt").unwrap(), "mine");
    assert_eq!(fs.content("first.txt").unwrap(), "1");
    assert!(fs.content("never.txt").is_none());
    assert_eq!(paths(&report), [PathBuf::from("first.txt")]);
    assert!(config.layout.is_empty());
}

#[test]
fn lifecycle_runs_plugin_by_plugin_in_order() {
    let log = new_log();
    let registry = registry(
        vec![
            TestPlugin::new("p1/v1", &[ApiCreator])
                .template(Template::new(
                    "api/%[version]/%[kind-snake].txt",
                    "{{KIND}} in {{QUALIFIED_GROUP}}",
                ))
                .log(&log),
            TestPlugin::new("p2/v1", &[ApiCreator]).log(&log),
        ],
        vec![],
    );
    let fs = MemFs::new();
    let mut config = MemConfig::new();

    let report =
        ScaffoldService::new(&registry).execute(create_api(&["p1/v1", "p2/v1"]), &fs, &mut config);

    assert!(report.is_success(), "{:?}", report.error);
    let phases = [
        "read-flags",
        "inject-config",
        "inject-resource",
        "pre-scaffold",
        "scaffold",
        "post-scaffold",
    ];
    let expected: Vec<String> = ["p1/v1", "p2/v1"]
        .iter()
        .flat_map(|p| phases.iter().map(move |ph| format!("{p}:{ph}")))
        .collect();
    assert_eq!(entries(&log), expected);

    assert_eq!(
        fs.content("api/v1/cron_job.txt").unwrap(),
        "CronJob in batch.example.com"
    );
    assert_eq!(config.resources.len(), 1);
    assert_eq!(config.resources[0].domain, "example.com");
    assert!(config.layout.is_empty());
}

#[test]
fn later_plugin_patches_earlier_output_in_same_run() {
    let makefile = RelativePath::try_new("Makefile").unwrap();
    let registry = registry(
        vec![
            TestPlugin::new("base/v1", &[ApiCreator]).template(
                Template::new("Makefile", "all:\n# +scaffold:targets\n")
                    .with_policy(ExistsPolicy::Skip),
            ),
            TestPlugin::new("extra/v1", &[ApiCreator]).patch(AnchorPatch::insert_after(
                makefile,
                "# +scaffold:targets\n",
                "extra:\n",
            )),
        ],
        vec![],
    );
    let fs = MemFs::new();

    let report = ScaffoldService::new(&registry).execute(
        create_api(&["base/v1", "extra/v1"]),
        &fs,
        &mut MemConfig::new(),
    );

    assert!(report.is_success(), "{:?}", report.error);
    assert_eq!(
        fs.content("Makefile").unwrap(),
        "all:\n# +scaffold:targets\nextra:\n"
    );
    assert_eq!(paths(&report), [PathBuf::from("Makefile")]);
}

#[test]
fn missing_anchor_reports_plugin_phase_and_anchor() {
    let registry = registry(
        vec![TestPlugin::new("extra/v1", &[Editor]).patch(AnchorPatch::replace(
            RelativePath::try_new("Makefile").unwrap(),
            "# +marker",
            "x",
        ))],
        vec![],
    );
    let fs = MemFs::new().with_file("Makefile", "all:\n");

    let report = ScaffoldService::new(&registry).execute(
        ExecuteRequest::new(Operation::Edit, v3()).with_plugins(["extra/v1"]),
        &fs,
        &mut MemConfig::new(),
    );

    let (plugin, phase, inner) = phase_failure(&report);
    assert_eq!((plugin.as_str(), phase), ("extra/v1", Phase::Scaffold));
    assert!(matches!(
        inner,
        StratumError::Application(ApplicationError::AnchorNotFound { anchor, .. }) if anchor == "# +marker"
    ));
    assert_eq!(fs.content("Makefile").unwrap(), "all:\n");
}

#[test]
fn pre_scaffold_failure_stops_before_that_plugin_writes() {
    let log = new_log();
    let registry = registry(
        vec![
            TestPlugin::new("p1/v1", &[ApiCreator])
                .template(Template::new("one.txt", "1"))
                .log(&log),
            TestPlugin::new("p2/v1", &[ApiCreator])
                .template(Template::new("two.txt", "2"))
                .fail_at(Phase::PreScaffold)
                .log(&log),
        ],
        vec![],
    );
    let fs = MemFs::new();
    let mut config = MemConfig::new();

    let report =
        ScaffoldService::new(&registry).execute(create_api(&["p1/v1", "p2/v1"]), &fs, &mut config);

    let (plugin, phase, _) = phase_failure(&report);
    assert_eq!((plugin.as_str(), phase), ("p2/v1", Phase::PreScaffold));
    assert_eq!(fs.paths(), ["one.txt"]);
    assert_eq!(entries(&log).last().unwrap(), "p2/v1:pre-scaffold");
    assert!(config.resources.is_empty());
}

#[test]
fn pre_scaffold_never_reaches_the_filesystem_writer() {
    let registry = registry(
        vec![TestPlugin::new("p/v1", &[Initializer])
            .template(Template::new("x.txt", "x"))
            .fail_at(Phase::PreScaffold)],
        vec![],
    );
    let mut fs = MockFs::new();
    fs.expect_exists().return_const(false);
    fs.expect_write_file().never();
    fs.expect_create_dir_all().never();

    let report = ScaffoldService::new(&registry).execute(init(&["p/v1"]), &fs, &mut MemConfig::new());

    assert_eq!(phase_failure(&report).1, Phase::PreScaffold);
    assert!(report.written_paths.is_empty());
}

#[test]
fn pre_scaffold_write_attempt_is_rejected() {
    let registry = registry(
        vec![TestPlugin::new("p/v1", &[Initializer]).write_in_pre_scaffold()],
        vec![],
    );
    let mut fs = MockFs::new();
    fs.expect_write_file().never();

    let report = ScaffoldService::new(&registry).execute(init(&["p/v1"]), &fs, &mut MemConfig::new());

    let (_, phase, inner) = phase_failure(&report);
    assert_eq!(phase, Phase::PreScaffold);
    assert!(matches!(
        inner,
        StratumError::Application(ApplicationError::ValidationFailed(_))
    ));
}

#[test]
fn unknown_flag_fails_before_any_phase_runs() {
    let log = new_log();
    let registry = registry(
        vec![TestPlugin::new("p/v1", &[Initializer])
            .flag("force")
            .template(Template::new("x.txt", "x"))
            .log(&log)],
        vec![],
    );
    let fs = MemFs::new();
    let request = init(&["p/v1"]).with_flags(RawFlags::parse(["--force", "--bogus"]).unwrap());

    let report = ScaffoldService::new(&registry).execute(request, &fs, &mut MemConfig::new());

    match report.error {
        Some(StratumError::Application(ApplicationError::ValidationFailed(msg))) => {
            assert!(msg.contains("--bogus"), "{msg}");
            assert!(!msg.contains("--force"), "{msg}");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(entries(&log).is_empty());
    assert!(fs.paths().is_empty());
}

#[test]
fn declared_flags_are_read_by_the_plugin() {
    let log = new_log();
    let registry = registry(
        vec![TestPlugin::new("p/v1", &[Initializer]).flag("force").log(&log)],
        vec![],
    );
    let request = init(&["p/v1"]).with_flags(RawFlags::parse(["--force"]).unwrap());

    let report =
        ScaffoldService::new(&registry).execute(request, &MemFs::new(), &mut MemConfig::new());

    assert!(report.is_success());
    assert!(entries(&log).contains(&"p/v1:flag:force".to_string()));
}

#[test]
fn create_requires_a_valid_resource() {
    let log = new_log();
    let registry = registry(
        vec![TestPlugin::new("p/v1", &[ApiCreator]).log(&log)],
        vec![],
    );
    let service = ScaffoldService::new(&registry);

    let missing = ExecuteRequest::new(Operation::CreateApi, v3()).with_plugins(["p/v1"]);
    let report = service.execute(missing, &MemFs::new(), &mut MemConfig::new());
    assert!(matches!(
        report.error,
        Some(StratumError::Application(ApplicationError::ValidationFailed(_)))
    ));

    let invalid = ExecuteRequest::new(Operation::CreateApi, v3())
        .with_plugins(["p/v1"])
        .with_resource(Resource::new("batch", "v1", "lowercase"));
    let report = service.execute(invalid, &MemFs::new(), &mut MemConfig::new());
    assert!(matches!(
        report.error,
        Some(StratumError::Domain(DomainError::InvalidResource(_)))
    ));

    assert!(entries(&log).is_empty());
}

#[test]
fn webhook_run_merges_into_existing_resource() {
    let registry = registry(
        vec![TestPlugin::new("p/v1", &[ApiCreator, WebhookCreator])],
        vec![],
    );
    let service = ScaffoldService::new(&registry);
    let fs = MemFs::new();
    let mut config = MemConfig::new();

    assert!(service.execute(create_api(&["p/v1"]), &fs, &mut config).is_success());

    let webhook = ExecuteRequest::new(Operation::CreateWebhook, v3())
        .with_plugins(["p/v1"])
        .with_resource(Resource::new("batch", "v1", "CronJob").with_webhooks(Webhooks {
            defaulting: true,
            ..Default::default()
        }));
    assert!(service.execute(webhook, &fs, &mut config).is_success());

    assert_eq!(config.resources.len(), 1);
    assert!(config.resources[0].webhooks.defaulting);
}

#[test]
fn resolution_failure_is_reported_without_running() {
    let registry = registry(
        vec![
            TestPlugin::new("one/v1", &[Initializer]),
            TestPlugin::new("two/v1", &[Initializer]),
        ],
        vec![],
    );

    let report = ScaffoldService::new(&registry).execute(
        init(&["one/v1", "two/v1"]),
        &MemFs::new(),
        &mut MemConfig::new(),
    );

    assert!(matches!(
        report.error,
        Some(StratumError::Domain(DomainError::DuplicateCapability { .. }))
    ));
    assert!(report.resolved.is_empty());
    assert!(report.written_paths.is_empty());
}

#[test]
fn describe_collects_metadata_and_flags() {
    let registry = registry(
        vec![TestPlugin::new("p/v1", &[Initializer]).flag("force")],
        vec![],
    );

    let help = ScaffoldService::new(&registry)
        .describe(&init(&["p/v1"]).with_command_name("stratum"))
        .unwrap();

    assert_eq!(help.len(), 1);
    assert_eq!(help[0].metadata.description, "p/v1 test plugin");
    assert_eq!(help[0].metadata.examples, "stratum --plugins p/v1");
    assert_eq!(help[0].flags[0].name, "force");
}
