//! User and group ID mappings.

use serde::{Deserialize, Serialize};

/// One contiguous range of mapped IDs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMap {
    /// First ID inside the container.
    pub container_id: u32,
    /// First ID on the host.
    pub host_id: u32,
    /// Number of IDs in the range.
    pub size: u32,
}

/// ID mapping configuration of a container's user namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdMappingOptions {
    /// Use the host's UID mapping.
    pub host_uid_mapping: bool,
    /// Use the host's GID mapping.
    pub host_gid_mapping: bool,
    /// UID ranges.
    pub uid_map: Vec<IdMap>,
    /// GID ranges.
    pub gid_map: Vec<IdMap>,
    /// Let the runtime allocate a free range automatically.
    pub auto_userns: bool,
}
