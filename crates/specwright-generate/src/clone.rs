//! Reverse mapping: rebuilds a draft from a created container.

use std::collections::BTreeMap;

use specwright_common::constants::{
    DEFAULT_HEALTH_LOG_DESTINATION, DEFAULT_HEALTH_MAX_LOG_COUNT, DEFAULT_HEALTH_MAX_LOG_SIZE,
};
use specwright_common::error::Result;
use specwright_runtime::Runtime;
use specwright_runtime::store::ContainerRecord;
use specwright_spec::DraftSpec;
use specwright_spec::infra::InfraInherit;

use crate::namespaces::restore_namespaces;
use crate::security::map_security_config;

/// Result of the reverse mapping.
#[derive(Debug, Clone)]
pub struct ClonedSpec {
    /// The source container.
    pub container: ContainerRecord,
    /// Draft reproducing the source container.
    pub spec: DraftSpec,
    /// Pod-inheritable settings, when the source is a pod's infra container.
    pub infra: Option<InfraInherit>,
}

/// Rebuilds a draft from the stored configuration of `container`.
///
/// `draft` carries caller overrides: its rootfs, image and resource limits
/// are kept when set. Every other field is taken from the stored
/// configuration.
///
/// # Errors
///
/// Returns [`SpecError::Lookup`](specwright_common::error::SpecError::Lookup)
/// if the container or one of its networks cannot be found.
pub fn config_to_spec(
    runtime: &Runtime,
    draft: Option<DraftSpec>,
    container: &str,
) -> Result<ClonedSpec> {
    let record = runtime.containers().lookup_container(container)?;
    let conf = &record.config;
    let mut spec = draft.unwrap_or_default();

    spec.name = Some(conf.name.clone());
    spec.pod = conf.pod.as_ref().map(ToString::to_string);
    spec.command.clone_from(&conf.command);
    spec.labels.clone_from(&conf.labels);
    spec.annotations.clone_from(&conf.annotations);
    spec.stop_signal = conf.stop_signal;

    if spec.resource_limits.is_none() {
        spec.resource_limits.clone_from(&conf.resource_limits);
    }
    if !conf.process_env.is_empty() {
        spec.env = conf.env_map();
    }

    restore_namespaces(conf, &mut spec);

    spec.health_log_destination = Some(
        conf.health_log_destination
            .clone()
            .unwrap_or_else(|| DEFAULT_HEALTH_LOG_DESTINATION.to_string()),
    );
    spec.health_max_log_count = Some(conf.health_max_log_count.unwrap_or(DEFAULT_HEALTH_MAX_LOG_COUNT));
    spec.health_max_log_size = Some(conf.health_max_log_size.unwrap_or(DEFAULT_HEALTH_MAX_LOG_SIZE));
    spec.health_config.clone_from(&conf.health_check);
    spec.health_on_failure = Some(conf.health_on_failure);

    spec.id_mappings = Some(conf.id_mappings.clone());
    spec.container_create_command.clone_from(&conf.create_command);
    if spec.rootfs.as_deref().is_none_or(str::is_empty) {
        spec.rootfs.clone_from(&conf.rootfs);
    }
    if spec.image.as_deref().is_none_or(str::is_empty) {
        spec.image = conf.rootfs_image_id.as_ref().map(ToString::to_string);
    }

    spec.volumes.clone_from(&conf.named_volumes);
    spec.image_volumes.clone_from(&conf.image_volumes);
    spec.overlay_volumes.clone_from(&conf.overlay_volumes);
    spec.mounts = conf.user_mounts();
    spec.host_device_list.clone_from(&conf.host_devices);

    let mut networks = BTreeMap::new();
    for (reference, options) in &conf.networks {
        let network = runtime.networks().inspect_network(reference)?;
        let _ = networks.insert(network.name, options.clone());
    }
    spec.networks = networks;

    spec.shm_size = Some(conf.shm_size);
    spec.use_image_hostname = Some(conf.use_image_hostname);
    spec.use_image_hosts = Some(conf.use_image_hosts);

    map_security_config(conf, &mut spec);

    let infra = conf.is_infra.then(|| InfraInherit::from(&spec));
    tracing::info!(
        container = %conf.id.short(),
        name = %conf.name,
        infra = infra.is_some(),
        "container config mapped to spec"
    );
    Ok(ClonedSpec {
        container: record,
        spec,
        infra,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use specwright_common::config::DaemonConfig;
    use specwright_common::types::{ContainerId, ContainerState, ImageId, PodId, ResourceLimits};
    use specwright_common::error::SpecError;
    use specwright_image::store::{Image, ImageData, ImageStore};
    use specwright_runtime::state::LocalState;
    use specwright_runtime::store::Network;
    use specwright_spec::ResolvedContainerConfig;
    use specwright_spec::network::NetworkOptions;
    use specwright_spec::volume::{Mount, NamedVolume};

    use super::*;

    struct NoImages;

    impl ImageStore for NoImages {
        fn lookup_image(&self, reference: &str) -> Result<(Image, String)> {
            Err(SpecError::lookup("image", reference))
        }

        fn image(&self, id: &ImageId) -> Result<Image> {
            Err(SpecError::lookup("image", id.as_str()))
        }

        fn inspect(&self, image: &Image) -> Result<ImageData> {
            Err(SpecError::lookup("image", image.id.as_str()))
        }
    }

    fn stored() -> ResolvedContainerConfig {
        ResolvedContainerConfig {
            id: ContainerId::new("c0ffee000000"),
            name: "web".into(),
            pod: Some(PodId::new("pod1")),
            rootfs_image_id: Some(ImageId::new("img1")),
            command: vec!["nginx".into()],
            process_env: vec!["A=1".into(), "B=2".into()],
            label_opts: vec!["type:spc_t".into()],
            resource_limits: Some(ResourceLimits {
                memory: Some(1 << 20),
                ..ResourceLimits::default()
            }),
            networks: BTreeMap::from([("net0123".to_string(), NetworkOptions::default())]),
            user_volumes: vec!["/data".into()],
            named_volumes: vec![NamedVolume {
                name: "cache".into(),
                dest: "/cache".into(),
                options: Vec::new(),
            }],
            mounts: vec![Mount::bind("/srv/data", "/data")],
            shm_size: 65_536,
            ..ResolvedContainerConfig::default()
        }
    }

    fn runtime(config: ResolvedContainerConfig) -> Runtime {
        let mut state = LocalState::default();
        state.add_container(ContainerRecord {
            config,
            state: ContainerState::Running,
        });
        state.add_network(Network {
            id: "net0123".into(),
            name: "frontend".into(),
            driver: "bridge".into(),
        });
        Runtime::builder(DaemonConfig::default())
            .images(Arc::new(NoImages))
            .state(state)
            .build()
            .expect("runtime")
    }

    #[test]
    fn maps_stored_config_into_draft() {
        let rt = runtime(stored());
        let cloned = config_to_spec(&rt, None, "web").expect("clone");
        let spec = cloned.spec;
        assert_eq!(spec.name.as_deref(), Some("web"));
        assert_eq!(spec.pod.as_deref(), Some("pod1"));
        assert_eq!(spec.image.as_deref(), Some("img1"));
        assert_eq!(spec.env.get("B").map(String::as_str), Some("2"));
        assert_eq!(spec.selinux_opts, vec!["type:spc_t"]);
        assert_eq!(spec.mounts, vec![Mount::bind("/srv/data", "/data")]);
        assert!(spec.networks.contains_key("frontend"));
        assert_eq!(spec.shm_size, Some(65_536));
        assert_eq!(spec.health_log_destination.as_deref(), Some(DEFAULT_HEALTH_LOG_DESTINATION));
        assert_eq!(spec.health_max_log_count, Some(DEFAULT_HEALTH_MAX_LOG_COUNT));
        assert_eq!(spec.health_max_log_size, Some(DEFAULT_HEALTH_MAX_LOG_SIZE));
        assert!(cloned.infra.is_none());
        assert_eq!(cloned.container.id().as_str(), "c0ffee000000");
    }

    #[test]
    fn caller_overrides_survive() {
        let rt = runtime(stored());
        let mut draft = DraftSpec::from_image("other:latest");
        draft.resource_limits = Some(ResourceLimits {
            pids: Some(5),
            ..ResourceLimits::default()
        });
        let spec = config_to_spec(&rt, Some(draft), "c0ffee").expect("clone").spec;
        assert_eq!(spec.image.as_deref(), Some("other:latest"));
        assert_eq!(spec.resource_limits.and_then(|l| l.pids), Some(5));
    }

    #[test]
    fn infra_container_yields_inheritable_shape() {
        let mut config = stored();
        config.is_infra = true;
        config.host_devices = vec!["/dev/fuse".into()];
        let rt = runtime(config);
        let cloned = config_to_spec(&rt, None, "web").expect("clone");
        let infra = cloned.infra.expect("infra shape");
        assert_eq!(infra.host_device_list, vec!["/dev/fuse"]);
        assert_eq!(infra.shm_size, Some(65_536));
    }

    #[test]
    fn unknown_container_or_network_fails_lookup() {
        let rt = runtime(stored());
        assert!(config_to_spec(&rt, None, "ghost").expect_err("absent").is_lookup());

        let mut config = stored();
        config.networks = BTreeMap::from([("gone".to_string(), NetworkOptions::default())]);
        let rt = runtime(config);
        assert!(config_to_spec(&rt, None, "web").expect_err("network").is_lookup());
    }
}
