//! Resolution pipeline tests against on-disk stores.
//!
//! Images come from an [`ImageCatalog`] and containers, pods and networks
//! from a [`LocalState`] written to and reloaded from a temporary
//! directory, the same way the CLI wires them.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use specwright_common::config::DaemonConfig;
use specwright_common::error::SpecError;
use specwright_common::types::{ContainerId, ContainerState, ImageId, PodId};
use specwright_generate::{NameKind, check_name, complete_spec, config_to_spec};
use specwright_image::catalog::{ImageCatalog, ImageEntry};
use specwright_image::store::ImageData;
use specwright_runtime::Runtime;
use specwright_runtime::host::FixedEnv;
use specwright_runtime::state::LocalState;
use specwright_runtime::store::{ContainerRecord, Pod};
use specwright_spec::draft::InitContainerType;
use specwright_spec::health::{HealthConfig, HealthInterval};
use specwright_spec::network::PortMapping;
use specwright_spec::{DraftSpec, Namespace, ResolvedContainerConfig};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    runtime: Runtime,
}

fn image_config() -> ImageData {
    ImageData {
        env: vec![
            "PATH=/usr/local/bin:/usr/bin".into(),
            "B=2".into(),
            "C=1".into(),
            "https_proxy=http://image:8080".into(),
        ],
        labels: BTreeMap::from([("maintainer".to_string(), "ops".to_string())]),
        stop_signal: Some("SIGQUIT".into()),
        health_check: Some(HealthConfig {
            test: vec!["CMD".into(), "/healthz".into()],
            interval: HealthInterval::Every(Duration::from_secs(10)),
            ..HealthConfig::default()
        }),
        ..ImageData::default()
    }
}

fn fixture(config: DaemonConfig, state: LocalState, host: &[(&str, &str)]) -> Fixture {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let catalog = ImageCatalog::open(dir.path()).expect("catalog");
    let _ = catalog
        .register(ImageEntry {
            id: ImageId::default(),
            names: vec!["localhost/web:latest".into()],
            config: Some(image_config()),
            manifests: Vec::new(),
            created_at: Utc::now(),
        })
        .expect("register");

    let state_path = dir.path().join("state.json");
    state.save(&state_path).expect("save state");
    let state = LocalState::load(&state_path).expect("load state");

    let runtime = Runtime::builder(config)
        .images(Arc::new(catalog))
        .state(state)
        .host_env(Arc::new(FixedEnv::new(host.iter().copied())))
        .build()
        .expect("runtime");
    Fixture { _dir: dir, runtime }
}

fn web_draft() -> DraftSpec {
    DraftSpec::from_image("web")
}

fn member(id: &str, name: &str, pod: &str, state: ContainerState) -> ContainerRecord {
    ContainerRecord {
        config: ResolvedContainerConfig {
            id: ContainerId::new(id),
            name: name.into(),
            pod: Some(PodId::new(pod)),
            ..ResolvedContainerConfig::default()
        },
        state,
    }
}

// ── Environment ──────────────────────────────────────────────────────

#[test]
fn environment_layers_apply_in_precedence_order() {
    let config = DaemonConfig {
        env: vec!["A=2".into(), "B=1".into()],
        ..DaemonConfig::default()
    };
    let fx = fixture(config, LocalState::default(), &[]);
    let mut draft = web_draft();
    draft.env = BTreeMap::from([("C".to_string(), "2".to_string())]);

    let _ = complete_spec(&fx.runtime, &mut draft).expect("complete");
    assert_eq!(draft.env.get("A").map(String::as_str), Some("2"));
    assert_eq!(draft.env.get("B").map(String::as_str), Some("2"));
    assert_eq!(draft.env.get("C").map(String::as_str), Some("2"));
    assert_eq!(draft.env.get("PATH").map(String::as_str), Some("/usr/local/bin:/usr/bin"));
}

#[test]
fn unset_all_leaves_only_explicit_variables() {
    let fx = fixture(
        DaemonConfig {
            env: vec!["A=1".into()],
            ..DaemonConfig::default()
        },
        LocalState::default(),
        &[],
    );
    let mut draft = web_draft();
    draft.unset_env_all = Some(true);
    draft.env = BTreeMap::from([("ONLY".to_string(), "me".to_string())]);

    let _ = complete_spec(&fx.runtime, &mut draft).expect("complete");
    assert_eq!(draft.env, BTreeMap::from([("ONLY".to_string(), "me".to_string())]));
}

#[test]
fn proxy_variables_pass_through_after_unset() {
    let fx = fixture(
        DaemonConfig::default(),
        LocalState::default(),
        &[("https_proxy", "http://proxy:3128"), ("SECRET", "x")],
    );
    let mut draft = web_draft();
    draft.unset_env_all = Some(true);
    draft.http_proxy = Some(true);

    let _ = complete_spec(&fx.runtime, &mut draft).expect("complete");
    assert_eq!(
        draft.env,
        BTreeMap::from([("https_proxy".to_string(), "http://proxy:3128".to_string())])
    );
}

#[test]
fn image_proxy_wins_over_daemon_pass_through() {
    let fx = fixture(
        DaemonConfig::default(),
        LocalState::default(),
        &[("https_proxy", "http://host:3128"), ("http_proxy", "http://host:3128")],
    );
    let mut draft = web_draft();
    let _ = complete_spec(&fx.runtime, &mut draft).expect("complete");
    assert_eq!(
        draft.env.get("https_proxy").map(String::as_str),
        Some("http://image:8080")
    );
    assert_eq!(
        draft.env.get("http_proxy").map(String::as_str),
        Some("http://host:3128")
    );

    let mut draft = web_draft();
    draft.http_proxy = Some(true);
    let _ = complete_spec(&fx.runtime, &mut draft).expect("complete");
    assert_eq!(
        draft.env.get("https_proxy").map(String::as_str),
        Some("http://host:3128")
    );
}

#[test]
fn merge_directives_chain_on_the_same_key() {
    let fx = fixture(DaemonConfig::default(), LocalState::default(), &[]);
    let mut draft = web_draft();
    draft.env_merge = vec!["PATH=$PATH:/a".into(), "PATH=$PATH:/b".into()];

    let _ = complete_spec(&fx.runtime, &mut draft).expect("complete");
    assert_eq!(
        draft.env.get("PATH").map(String::as_str),
        Some("/usr/local/bin:/usr/bin:/a:/b")
    );
}

#[test]
fn merge_directive_extends_image_value() {
    let fx = fixture(DaemonConfig::default(), LocalState::default(), &[]);
    let mut draft = web_draft();
    draft.env_merge = vec!["PATH=${PATH}:/opt/bin".into()];

    let _ = complete_spec(&fx.runtime, &mut draft).expect("complete");
    assert_eq!(
        draft.env.get("PATH").map(String::as_str),
        Some("/usr/local/bin:/usr/bin:/opt/bin")
    );
}

#[test]
fn merge_directive_without_equals_is_rejected() {
    let fx = fixture(DaemonConfig::default(), LocalState::default(), &[]);
    let mut draft = web_draft();
    draft.env_merge = vec!["NOEQUALS".into()];

    let err = complete_spec(&fx.runtime, &mut draft).expect_err("must fail");
    assert!(matches!(err, SpecError::Validation { .. }));
}

// ── Health and stop signal ───────────────────────────────────────────

#[test]
fn disabled_interval_is_never_defaulted() {
    let fx = fixture(DaemonConfig::default(), LocalState::default(), &[]);
    let mut draft = web_draft();
    draft.health_config = Some(HealthConfig {
        interval: HealthInterval::Disabled,
        ..HealthConfig::default()
    });

    let _ = complete_spec(&fx.runtime, &mut draft).expect("complete");
    let health = draft.health_config.expect("health");
    assert_eq!(health.interval, HealthInterval::Disabled);
    assert_eq!(health.test, vec!["CMD", "/healthz"]);
}

#[test]
fn image_health_gets_defaults_for_zero_fields() {
    let fx = fixture(DaemonConfig::default(), LocalState::default(), &[]);
    let mut draft = web_draft();

    let _ = complete_spec(&fx.runtime, &mut draft).expect("complete");
    let health = draft.health_config.expect("health");
    assert_eq!(health.interval, HealthInterval::Every(Duration::from_secs(10)));
    assert_eq!(health.retries, 3);
    assert_eq!(health.timeout, Duration::from_secs(30));
    assert_eq!(
        draft.stop_signal,
        Some(nix::sys::signal::Signal::SIGQUIT)
    );
    assert_eq!(draft.labels.get("maintainer").map(String::as_str), Some("ops"));
}

// ── Pods and networking ──────────────────────────────────────────────

#[test]
fn init_container_into_running_pod_conflicts() {
    let mut state = LocalState::default();
    state.add_pod(Pod {
        id: PodId::new("pod0001"),
        name: "shop".into(),
        infra_container_id: Some(ContainerId::new("infra01")),
    });
    state.add_container(member("infra01", "shop-infra", "pod0001", ContainerState::Running));
    let fx = fixture(DaemonConfig::default(), state, &[]);

    let mut draft = web_draft();
    draft.pod = Some("shop".into());
    draft.init_container_type = Some(InitContainerType::Once);
    let err = complete_spec(&fx.runtime, &mut draft).expect_err("must fail");
    assert!(matches!(err, SpecError::PolicyConflict { .. }));

    let mut draft = web_draft();
    draft.pod = Some("shop".into());
    let _ = complete_spec(&fx.runtime, &mut draft).expect("regular member");
    assert_eq!(
        draft.annotations.get(specwright_common::constants::SANDBOX_ID_ANNOTATION).map(String::as_str),
        Some("infra01")
    );
}

#[test]
fn port_mappings_with_host_network_warn_and_are_kept() {
    let fx = fixture(DaemonConfig::default(), LocalState::default(), &[]);
    let mapping = PortMapping {
        host_ip: None,
        container_port: 80,
        host_port: 8080,
        range: 1,
        protocol: "tcp".into(),
    };
    let mut draft = web_draft();
    draft.net_ns = Namespace::Host;
    draft.port_mappings = vec![mapping.clone()];

    let warnings = complete_spec(&fx.runtime, &mut draft).expect("complete");
    assert_eq!(
        warnings,
        vec![
            "Port mappings have been discarded because \"host\" network namespace mode does not support them"
        ]
    );
    assert_eq!(draft.port_mappings, vec![mapping]);
}

// ── Clone path ───────────────────────────────────────────────────────

#[test]
fn slirp_container_clones_with_options_and_ports() {
    let mut state = LocalState::default();
    state.add_container(ContainerRecord {
        config: ResolvedContainerConfig {
            id: ContainerId::new("abc123def456"),
            name: "edge".into(),
            net_mode: "slirp4netns:allow_host_loopback=true,port_handler=slirp4netns"
                .parse()
                .expect("mode"),
            exposed_ports: BTreeMap::from([(443, vec!["tcp".to_string()])]),
            port_mappings: vec![PortMapping {
                host_ip: Some("127.0.0.1".into()),
                container_port: 443,
                host_port: 8443,
                range: 1,
                protocol: "tcp".into(),
            }],
            ..ResolvedContainerConfig::default()
        },
        state: ContainerState::Exited,
    });
    let fx = fixture(DaemonConfig::default(), state, &[]);

    let cloned = config_to_spec(&fx.runtime, None, "edge").expect("clone");
    assert_eq!(
        cloned.spec.net_ns,
        Namespace::Slirp(Some(
            "allow_host_loopback=true,port_handler=slirp4netns".into()
        ))
    );
    assert_eq!(cloned.spec.port_mappings.len(), 1);
    assert_eq!(cloned.spec.expose.get(&443).map(String::as_str), Some("tcp"));

    let name = check_name(&fx.runtime, "edge", NameKind::Container);
    assert_eq!(name, "edge-clone");
}

#[test]
fn clone_names_skip_existing_copies() {
    let mut state = LocalState::default();
    for (i, name) in ["db-clone1", "db-clone2", "db-clone3"].iter().enumerate() {
        state.add_container(ContainerRecord {
            config: ResolvedContainerConfig {
                id: ContainerId::new(format!("c{i}")),
                name: (*name).to_string(),
                ..ResolvedContainerConfig::default()
            },
            state: ContainerState::Created,
        });
    }
    let fx = fixture(DaemonConfig::default(), state, &[]);
    assert_eq!(check_name(&fx.runtime, "db-clone", NameKind::Container), "db-clone4");
    assert_eq!(check_name(&fx.runtime, "db-clone", NameKind::Pod), "db-clone1");
}

#[test]
fn cloned_draft_completes_against_its_image() {
    let fx = fixture(DaemonConfig::default(), LocalState::default(), &[]);
    let mut draft = web_draft();
    let _ = complete_spec(&fx.runtime, &mut draft).expect("complete");

    let mut again = draft.clone();
    let warnings = complete_spec(&fx.runtime, &mut again).expect("second pass");
    assert!(warnings.is_empty());
    assert_eq!(again, draft);
}
