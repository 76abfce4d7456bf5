//! Settings an infra container passes on to the members of its pod.

use serde::{Deserialize, Serialize};
use specwright_common::types::ResourceLimits;

use crate::draft::DraftSpec;
use crate::idmap::IdMappingOptions;
use crate::namespace::Namespace;
use crate::volume::{ImageVolume, Mount, NamedVolume, OverlayVolume};

/// Pod-wide subset of a draft derived from an infra container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfraInherit {
    /// Host devices.
    pub host_device_list: Vec<String>,
    /// Named volumes.
    pub volumes: Vec<NamedVolume>,
    /// Image volumes.
    pub image_volumes: Vec<ImageVolume>,
    /// Overlay volumes.
    pub overlay_volumes: Vec<OverlayVolume>,
    /// Mounts.
    pub mounts: Vec<Mount>,
    /// Seccomp profile path.
    pub seccomp_profile_path: Option<String>,
    /// SELinux label options.
    pub selinux_opts: Vec<String>,
    /// Resource limits.
    pub resource_limits: Option<ResourceLimits>,
    /// Size of `/dev/shm` in bytes.
    pub shm_size: Option<i64>,
    /// User namespace.
    pub user_ns: Namespace,
    /// ID mappings.
    pub id_mappings: Option<IdMappingOptions>,
}

impl From<&DraftSpec> for InfraInherit {
    fn from(draft: &DraftSpec) -> Self {
        Self {
            host_device_list: draft.host_device_list.clone(),
            volumes: draft.volumes.clone(),
            image_volumes: draft.image_volumes.clone(),
            overlay_volumes: draft.overlay_volumes.clone(),
            mounts: draft.mounts.clone(),
            seccomp_profile_path: draft.seccomp_profile_path.clone(),
            selinux_opts: draft.selinux_opts.clone(),
            resource_limits: draft.resource_limits.clone(),
            shm_size: draft.shm_size,
            user_ns: draft.user_ns.clone(),
            id_mappings: draft.id_mappings.clone(),
        }
    }
}
