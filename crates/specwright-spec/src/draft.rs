//! The draft container specification.
//!
//! A [`DraftSpec`] is built per request, enriched in place by the
//! resolution pipeline, and consumed once. Optional fields distinguish
//! "not specified, inherit a default" (`None`) from an explicit value,
//! including explicit zeros and `false`.

use std::collections::BTreeMap;

use nix::sys::signal::Signal;
use serde::{Deserialize, Serialize};
use specwright_common::config::{CgroupsMode, ImageVolumeMode};
use specwright_common::types::{ImageId, ResourceLimits};

use crate::health::{HealthConfig, HealthOnFailureAction};
use crate::idmap::IdMappingOptions;
use crate::namespace::{Namespace, NamespaceKind};
use crate::network::{ExposedPorts, NetworkOptions, PortMapping};
use crate::volume::{ImageVolume, Mount, NamedVolume, OverlayVolume};

/// Logging configuration of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log driver; the daemon default applies when unset.
    pub driver: Option<String>,
    /// Log file path for file-based drivers.
    pub path: Option<String>,
    /// Maximum log size in bytes.
    pub size: Option<i64>,
    /// Driver-specific options.
    pub options: BTreeMap<String, String>,
}

/// When an init container runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitContainerType {
    /// Runs on every pod start.
    Always,
    /// Runs once and is then removed.
    Once,
}

/// Image instance attached to a draft after lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedImage {
    /// Concrete image (a manifest-list instance, never the list itself).
    pub id: ImageId,
    /// Name the reference resolved to.
    pub resolved_name: String,
}

/// Partially-populated desired state of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftSpec {
    /// Container name.
    pub name: Option<String>,
    /// Image reference.
    pub image: Option<String>,
    /// Root filesystem path used instead of an image.
    pub rootfs: Option<String>,
    /// Architecture to select from a manifest list.
    pub image_arch: Option<String>,
    /// Operating system to select from a manifest list.
    pub image_os: Option<String>,
    /// Architecture variant to select from a manifest list.
    pub image_variant: Option<String>,
    /// Command to run.
    pub command: Vec<String>,
    /// Image volume treatment.
    pub image_volume_mode: Option<ImageVolumeMode>,

    /// Explicit environment; wins over every other source.
    pub env: BTreeMap<String, String>,
    /// `KEY=expression` entries expanded against the inherited environment.
    pub env_merge: Vec<String>,
    /// Inherited variables to remove.
    pub unset_env: Vec<String>,
    /// Drop the whole inherited environment.
    pub unset_env_all: Option<bool>,
    /// Pass the full host environment.
    pub env_host: Option<bool>,
    /// Pass host proxy variables.
    pub http_proxy: Option<bool>,
    /// Allocate a terminal.
    pub terminal: Option<bool>,

    /// Container labels.
    pub labels: BTreeMap<String, String>,
    /// Container annotations.
    pub annotations: BTreeMap<String, String>,

    /// Health check, or per-field overrides of the image's health check.
    pub health_config: Option<HealthConfig>,
    /// Action taken when the health check fails.
    pub health_on_failure: Option<HealthOnFailureAction>,
    /// Where health check results are logged.
    pub health_log_destination: Option<String>,
    /// Number of health check results kept.
    pub health_max_log_count: Option<u32>,
    /// Maximum size of one health check log entry.
    pub health_max_log_size: Option<u32>,

    /// Signal that stops the container.
    #[serde(with = "crate::signal::option_name")]
    pub stop_signal: Option<Signal>,
    /// Seccomp profile path.
    pub seccomp_profile_path: Option<String>,
    /// User (and optionally group) the process runs as.
    pub user: Option<String>,
    /// Supplementary groups.
    pub groups: Vec<String>,
    /// Run with extended privileges.
    pub privileged: Option<bool>,
    /// SELinux label options.
    pub selinux_opts: Vec<String>,
    /// Host users to add to the container's passwd file.
    pub host_users: Vec<String>,
    /// ID mappings of the user namespace.
    pub id_mappings: Option<IdMappingOptions>,

    /// Cgroups handling.
    pub cgroups_mode: Option<CgroupsMode>,
    /// Resource limits.
    pub resource_limits: Option<ResourceLimits>,
    /// Logging configuration.
    pub log_configuration: Option<LogConfig>,

    /// Pod to join, by name or ID.
    pub pod: Option<String>,
    /// Marks the container as a pod init container.
    pub init_container_type: Option<InitContainerType>,

    /// PID namespace.
    pub pid_ns: Namespace,
    /// Network namespace.
    pub net_ns: Namespace,
    /// Cgroup namespace.
    pub cgroup_ns: Namespace,
    /// IPC namespace.
    pub ipc_ns: Namespace,
    /// UTS namespace.
    pub uts_ns: Namespace,
    /// User namespace.
    pub user_ns: Namespace,

    /// Published ports.
    pub port_mappings: Vec<PortMapping>,
    /// Exposed ports.
    pub expose: ExposedPorts,
    /// Networks to attach, keyed by name.
    pub networks: BTreeMap<String, NetworkOptions>,

    /// Named volumes.
    pub volumes: Vec<NamedVolume>,
    /// Image volumes.
    pub image_volumes: Vec<ImageVolume>,
    /// Overlay volumes.
    pub overlay_volumes: Vec<OverlayVolume>,
    /// Bind and other mounts.
    pub mounts: Vec<Mount>,
    /// Host devices to add.
    pub host_device_list: Vec<String>,
    /// Size of `/dev/shm` in bytes.
    pub shm_size: Option<i64>,
    /// Take the hostname from the image.
    pub use_image_hostname: Option<bool>,
    /// Take `/etc/hosts` entries from the image.
    pub use_image_hosts: Option<bool>,
    /// Command line the container was originally created with.
    pub container_create_command: Vec<String>,

    #[serde(skip)]
    pub(crate) attached_image: Option<AttachedImage>,
}

impl DraftSpec {
    /// Creates a draft for a container running the given image.
    #[must_use]
    pub fn from_image(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            ..Self::default()
        }
    }

    /// Creates a draft for a container running from a bare root filesystem.
    #[must_use]
    pub fn from_rootfs(rootfs: impl Into<String>) -> Self {
        Self {
            rootfs: Some(rootfs.into()),
            ..Self::default()
        }
    }

    /// Returns `true` when the container is built from an image rather than a rootfs.
    #[must_use]
    pub fn uses_image(&self) -> bool {
        self.rootfs.as_deref().is_none_or(str::is_empty)
            && self.image.as_deref().is_some_and(|i| !i.is_empty())
    }

    /// Returns the image instance attached by a previous lookup.
    #[must_use]
    pub const fn attached_image(&self) -> Option<&AttachedImage> {
        self.attached_image.as_ref()
    }

    /// Attaches a resolved image instance.
    pub fn set_image(&mut self, id: ImageId, resolved_name: impl Into<String>) {
        self.attached_image = Some(AttachedImage {
            id,
            resolved_name: resolved_name.into(),
        });
    }

    /// Returns the declaration of one namespace.
    #[must_use]
    pub const fn namespace(&self, kind: NamespaceKind) -> &Namespace {
        match kind {
            NamespaceKind::Pid => &self.pid_ns,
            NamespaceKind::Net => &self.net_ns,
            NamespaceKind::Cgroup => &self.cgroup_ns,
            NamespaceKind::Ipc => &self.ipc_ns,
            NamespaceKind::Uts => &self.uts_ns,
            NamespaceKind::User => &self.user_ns,
        }
    }

    /// Returns a mutable reference to the declaration of one namespace.
    pub fn namespace_mut(&mut self, kind: NamespaceKind) -> &mut Namespace {
        match kind {
            NamespaceKind::Pid => &mut self.pid_ns,
            NamespaceKind::Net => &mut self.net_ns,
            NamespaceKind::Cgroup => &mut self.cgroup_ns,
            NamespaceKind::Ipc => &mut self.ipc_ns,
            NamespaceKind::Uts => &mut self.uts_ns,
            NamespaceKind::User => &mut self.user_ns,
        }
    }

    /// Returns `true` if the caller supplied a health check command.
    #[must_use]
    pub fn defines_health_test(&self) -> bool {
        self.health_config.as_ref().is_some_and(|hc| !hc.test.is_empty())
    }
}
