//! Container, pod and network store contracts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use specwright_common::error::Result;
use specwright_common::types::{ContainerId, ContainerState, PodId};
use specwright_spec::ResolvedContainerConfig;

/// A created container: its stored configuration and current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    /// Configuration written at creation time.
    pub config: ResolvedContainerConfig,
    /// Current lifecycle state.
    #[serde(default = "configured")]
    pub state: ContainerState,
}

const fn configured() -> ContainerState {
    ContainerState::Configured
}

impl ContainerRecord {
    /// Container ID.
    #[must_use]
    pub const fn id(&self) -> &ContainerId {
        &self.config.id
    }

    /// Container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }
}

/// A pod: a group of containers sharing namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pod {
    /// Pod ID.
    pub id: PodId,
    /// Pod name.
    pub name: String,
    /// Infra container anchoring the pod's shared namespaces.
    #[serde(default)]
    pub infra_container_id: Option<ContainerId>,
}

/// A network containers can attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Network ID.
    pub id: String,
    /// Canonical network name.
    pub name: String,
    /// Network driver.
    #[serde(default)]
    pub driver: String,
}

/// Access to created containers.
pub trait ContainerStore: Send + Sync {
    /// Looks up a container by name, full ID, or unique ID prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Lookup`](specwright_common::error::SpecError::Lookup)
    /// if no container matches.
    fn lookup_container(&self, reference: &str) -> Result<ContainerRecord>;
}

/// Access to pods.
pub trait PodStore: Send + Sync {
    /// Looks up a pod by name, full ID, or unique ID prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Lookup`](specwright_common::error::SpecError::Lookup)
    /// if no pod matches.
    fn lookup_pod(&self, reference: &str) -> Result<Pod>;

    /// Returns the state of every container in a pod.
    ///
    /// # Errors
    ///
    /// Returns an error if the pod's members cannot be read.
    fn pod_status(&self, pod: &PodId) -> Result<BTreeMap<ContainerId, ContainerState>>;
}

/// Access to networks.
pub trait NetworkStore: Send + Sync {
    /// Looks up a network by name, full ID, or unique ID prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Lookup`](specwright_common::error::SpecError::Lookup)
    /// if no network matches.
    fn inspect_network(&self, reference: &str) -> Result<Network>;
}
