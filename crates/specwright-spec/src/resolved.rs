//! Stored configuration of a created container.
//!
//! A [`ResolvedContainerConfig`] is written once when a container is
//! created and never changes afterwards. The clone path reads it back to
//! rebuild a draft.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use nix::sys::signal::Signal;
use serde::{Deserialize, Serialize};
use specwright_common::types::{ContainerId, ImageId, PodId, ResourceLimits};

use crate::health::{HealthConfig, HealthOnFailureAction};
use crate::idmap::IdMappingOptions;
use crate::namespace::NamespaceKind;
use crate::network::{NetworkMode, NetworkOptions, PortMapping};
use crate::volume::{ImageVolume, Mount, NamedVolume, OverlayVolume};

/// Containers whose namespaces this container joined, per domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedNamespaces {
    /// PID namespace owner.
    pub pid: Option<ContainerId>,
    /// Network namespace owner.
    pub net: Option<ContainerId>,
    /// Cgroup namespace owner.
    pub cgroup: Option<ContainerId>,
    /// IPC namespace owner.
    pub ipc: Option<ContainerId>,
    /// UTS namespace owner.
    pub uts: Option<ContainerId>,
    /// User namespace owner.
    pub user: Option<ContainerId>,
}

impl SharedNamespaces {
    /// Returns the container whose namespace of the given kind was joined.
    #[must_use]
    pub const fn get(&self, kind: NamespaceKind) -> Option<&ContainerId> {
        match kind {
            NamespaceKind::Pid => self.pid.as_ref(),
            NamespaceKind::Net => self.net.as_ref(),
            NamespaceKind::Cgroup => self.cgroup.as_ref(),
            NamespaceKind::Ipc => self.ipc.as_ref(),
            NamespaceKind::Uts => self.uts.as_ref(),
            NamespaceKind::User => self.user.as_ref(),
        }
    }
}

/// System-of-record configuration of a created container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvedContainerConfig {
    /// Container ID.
    pub id: ContainerId,
    /// Container name.
    pub name: String,
    /// Pod the container belongs to.
    pub pod: Option<PodId>,
    /// Whether this is its pod's infra container.
    pub is_infra: bool,
    /// Root filesystem path, for rootfs containers.
    pub rootfs: Option<String>,
    /// Image the root filesystem was created from.
    pub rootfs_image_id: Option<ImageId>,
    /// Name of the image the root filesystem was created from.
    pub rootfs_image_name: Option<String>,
    /// Command run by the container.
    pub command: Vec<String>,
    /// Process environment as `KEY=VALUE` entries.
    pub process_env: Vec<String>,
    /// Labels.
    pub labels: BTreeMap<String, String>,
    /// Annotations.
    pub annotations: BTreeMap<String, String>,
    /// Stop signal.
    #[serde(with = "crate::signal::option_name")]
    pub stop_signal: Option<Signal>,

    /// User the process runs as.
    pub user: Option<String>,
    /// Supplementary groups.
    pub groups: Vec<String>,
    /// Whether the container runs privileged.
    pub privileged: bool,
    /// SELinux label options.
    pub label_opts: Vec<String>,
    /// SELinux process label assigned at creation.
    pub process_label: Option<String>,
    /// Host users added to the passwd file.
    pub host_users: Vec<String>,
    /// Whether an entry for the invoking user was added to the passwd file.
    pub add_current_user_passwd_entry: bool,
    /// ID mappings.
    pub id_mappings: IdMappingOptions,

    /// Namespaces joined from other containers.
    pub shared_namespaces: SharedNamespaces,
    /// Network mode.
    pub net_mode: NetworkMode,
    /// Exposed ports with their protocols.
    pub exposed_ports: BTreeMap<u16, Vec<String>>,
    /// Published ports.
    pub port_mappings: Vec<PortMapping>,
    /// Attached networks, keyed by network ID or name.
    pub networks: BTreeMap<String, NetworkOptions>,
    /// Shared-memory directory; empty when IPC is not configured.
    pub shm_dir: String,
    /// Size of `/dev/shm` in bytes.
    pub shm_size: i64,
    /// Whether the hostname comes from the image.
    pub use_image_hostname: bool,
    /// Whether `/etc/hosts` entries come from the image.
    pub use_image_hosts: bool,

    /// Health check.
    pub health_check: Option<HealthConfig>,
    /// Action taken on failed health checks.
    pub health_on_failure: HealthOnFailureAction,
    /// Health log destination.
    pub health_log_destination: Option<String>,
    /// Number of health check results kept.
    pub health_max_log_count: Option<u32>,
    /// Maximum size of one health check log entry.
    pub health_max_log_size: Option<u32>,

    /// Named volumes.
    pub named_volumes: Vec<NamedVolume>,
    /// Image volumes.
    pub image_volumes: Vec<ImageVolume>,
    /// Overlay volumes.
    pub overlay_volumes: Vec<OverlayVolume>,
    /// Destinations of user-requested volumes and mounts.
    pub user_volumes: Vec<String>,
    /// Mount table of the generated runtime configuration.
    pub mounts: Vec<Mount>,
    /// Host devices.
    pub host_devices: Vec<String>,
    /// Resource limits.
    pub resource_limits: Option<ResourceLimits>,
    /// Seccomp profile path.
    pub seccomp_profile_path: Option<String>,
    /// Command line the container was created with.
    pub create_command: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl ResolvedContainerConfig {
    /// Returns the user-requested mounts from the live mount table.
    ///
    /// Only mounts whose destination the user asked for are returned, and
    /// destinations served by named, image or overlay volumes are left out.
    /// Sources are the ones the runtime actually resolved.
    #[must_use]
    pub fn user_mounts(&self) -> Vec<Mount> {
        let requested: HashSet<&str> = self.user_volumes.iter().map(String::as_str).collect();
        let volume_dests: HashSet<&str> = self
            .named_volumes
            .iter()
            .map(|v| v.dest.as_str())
            .chain(self.image_volumes.iter().map(|v| v.destination.as_str()))
            .chain(self.overlay_volumes.iter().map(|v| v.destination.as_str()))
            .collect();
        self.mounts
            .iter()
            .filter(|m| requested.contains(m.destination.as_str()))
            .filter(|m| !volume_dests.contains(m.destination.as_str()))
            .cloned()
            .collect()
    }

    /// Returns the process environment as a map; entries without `=` are skipped.
    #[must_use]
    pub fn env_map(&self) -> BTreeMap<String, String> {
        self.process_env
            .iter()
            .filter_map(|entry| entry.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}
