//! Namespace declarations of a cloned container.
//!
//! A namespace joined from another container is always restored as a
//! join of that container. Otherwise the declaration is inferred from the
//! stored configuration, one domain at a time.

use specwright_common::constants::HOST_SHM_DIR;
use specwright_spec::network::{ExposedPorts, NetworkMode};
use specwright_spec::{DraftSpec, Namespace, NamespaceKind, ResolvedContainerConfig};

/// Infers the declaration of one namespace from a stored configuration,
/// ignoring joined namespaces.
#[must_use]
pub fn infer_namespace(config: &ResolvedContainerConfig, kind: NamespaceKind) -> Namespace {
    match kind {
        NamespaceKind::Pid | NamespaceKind::Cgroup => Namespace::Default,
        NamespaceKind::Uts => Namespace::Private,
        NamespaceKind::Ipc => match config.shm_dir.as_str() {
            HOST_SHM_DIR => Namespace::Host,
            "" => Namespace::None,
            _ => Namespace::Default,
        },
        NamespaceKind::User => {
            if config.add_current_user_passwd_entry {
                Namespace::KeepId
            } else {
                Namespace::Default
            }
        }
        NamespaceKind::Net => match &config.net_mode {
            NetworkMode::Default => Namespace::Default,
            NetworkMode::Bridge => Namespace::Bridge,
            NetworkMode::Host => Namespace::Host,
            NetworkMode::None => Namespace::None,
            NetworkMode::Private => Namespace::Private,
            NetworkMode::Slirp4netns(options) => Namespace::Slirp(options.clone()),
            NetworkMode::Pasta(_) => Namespace::Pasta,
            NetworkMode::Path(path) => Namespace::Path(path.clone()),
            NetworkMode::Container(id) => Namespace::FromContainer(id.clone()),
            NetworkMode::Pod(id) => Namespace::FromPod(id.clone()),
        },
    }
}

/// Folds stored exposed ports into the draft form: protocols joined by commas.
#[must_use]
pub fn exposed_ports(config: &ResolvedContainerConfig) -> ExposedPorts {
    config
        .exposed_ports
        .iter()
        .map(|(port, protocols)| (*port, protocols.join(",")))
        .collect()
}

/// Restores all six namespace declarations of a draft.
///
/// Port data is carried over only when the network namespace is inferred
/// from a mode that publishes ports: bridge, slirp4netns and pasta.
pub fn restore_namespaces(config: &ResolvedContainerConfig, draft: &mut DraftSpec) {
    for kind in NamespaceKind::ALL {
        let namespace = if let Some(owner) = config.shared_namespaces.get(kind) {
            Namespace::FromContainer(owner.to_string())
        } else {
            if kind == NamespaceKind::Net && config.net_mode.carries_ports() {
                draft.expose = exposed_ports(config);
                draft.port_mappings.clone_from(&config.port_mappings);
            }
            infer_namespace(config, kind)
        };
        tracing::debug!(%kind, %namespace, "namespace restored");
        *draft.namespace_mut(kind) = namespace;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use specwright_common::types::ContainerId;
    use specwright_spec::network::PortMapping;
    use specwright_spec::resolved::SharedNamespaces;

    use super::*;

    fn port() -> PortMapping {
        PortMapping {
            host_ip: None,
            container_port: 80,
            host_port: 8080,
            range: 1,
            protocol: "tcp".into(),
        }
    }

    #[test]
    fn slirp_mode_keeps_options_and_ports() {
        let config = ResolvedContainerConfig {
            net_mode: "slirp4netns:port_handler=slirp4netns".parse().expect("mode"),
            exposed_ports: BTreeMap::from([(80, vec!["tcp".to_string(), "udp".to_string()])]),
            port_mappings: vec![port()],
            ..ResolvedContainerConfig::default()
        };
        let mut draft = DraftSpec::default();
        restore_namespaces(&config, &mut draft);
        assert_eq!(
            draft.net_ns,
            Namespace::Slirp(Some("port_handler=slirp4netns".into()))
        );
        assert_eq!(draft.port_mappings, vec![port()]);
        assert_eq!(draft.expose.get(&80).map(String::as_str), Some("tcp,udp"));
    }

    #[test]
    fn pasta_mode_keeps_ports_and_private_does_not() {
        let mut config = ResolvedContainerConfig {
            net_mode: "pasta".parse().expect("mode"),
            exposed_ports: BTreeMap::from([(443, vec!["tcp".to_string()])]),
            port_mappings: vec![port()],
            ..ResolvedContainerConfig::default()
        };
        let mut draft = DraftSpec::default();
        restore_namespaces(&config, &mut draft);
        assert_eq!(draft.net_ns, Namespace::Pasta);
        assert_eq!(draft.port_mappings, vec![port()]);
        assert_eq!(draft.expose.get(&443).map(String::as_str), Some("tcp"));

        config.net_mode = NetworkMode::Private;
        let mut draft = DraftSpec::default();
        restore_namespaces(&config, &mut draft);
        assert_eq!(draft.net_ns, Namespace::Private);
        assert!(draft.port_mappings.is_empty());
        assert!(draft.expose.is_empty());
    }

    #[test]
    fn sharing_wins_over_inference() {
        let config = ResolvedContainerConfig {
            net_mode: NetworkMode::Bridge,
            port_mappings: vec![port()],
            shared_namespaces: SharedNamespaces {
                net: Some(ContainerId::new("infra0")),
                ..SharedNamespaces::default()
            },
            ..ResolvedContainerConfig::default()
        };
        let mut draft = DraftSpec::default();
        restore_namespaces(&config, &mut draft);
        assert_eq!(draft.net_ns, Namespace::FromContainer("infra0".into()));
        assert!(draft.port_mappings.is_empty());
    }

    #[test]
    fn ipc_follows_shm_dir() {
        let mut config = ResolvedContainerConfig {
            shm_dir: "/dev/shm".into(),
            ..ResolvedContainerConfig::default()
        };
        assert_eq!(infer_namespace(&config, NamespaceKind::Ipc), Namespace::Host);
        config.shm_dir = String::new();
        assert_eq!(infer_namespace(&config, NamespaceKind::Ipc), Namespace::None);
        config.shm_dir = "/var/lib/containers/shm".into();
        assert_eq!(infer_namespace(&config, NamespaceKind::Ipc), Namespace::Default);
    }

    #[test]
    fn fixed_domains_and_user() {
        let mut config = ResolvedContainerConfig::default();
        assert_eq!(infer_namespace(&config, NamespaceKind::Pid), Namespace::Default);
        assert_eq!(infer_namespace(&config, NamespaceKind::Cgroup), Namespace::Default);
        assert_eq!(infer_namespace(&config, NamespaceKind::Uts), Namespace::Private);
        assert_eq!(infer_namespace(&config, NamespaceKind::User), Namespace::Default);
        config.add_current_user_passwd_entry = true;
        assert_eq!(infer_namespace(&config, NamespaceKind::User), Namespace::KeepId);
    }

    #[test]
    fn net_references_are_carried() {
        let mut config = ResolvedContainerConfig {
            net_mode: NetworkMode::Pod("p1".into()),
            ..ResolvedContainerConfig::default()
        };
        assert_eq!(
            infer_namespace(&config, NamespaceKind::Net),
            Namespace::FromPod("p1".into())
        );
        config.net_mode = NetworkMode::Path("/run/netns/x".into());
        assert_eq!(
            infer_namespace(&config, NamespaceKind::Net),
            Namespace::Path("/run/netns/x".into())
        );
        config.net_mode = NetworkMode::Host;
        assert_eq!(infer_namespace(&config, NamespaceKind::Net), Namespace::Host);
    }
}
