//! Persistent local state.
//!
//! Maintains a JSON index of created containers, pods and networks. The
//! index backs the container, pod and network stores when no engine
//! database is available.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use specwright_common::error::{Result, SpecError};
use specwright_common::types::{ContainerId, ContainerState, PodId};

use crate::store::{ContainerRecord, ContainerStore, Network, NetworkStore, Pod, PodStore};

/// Snapshot of the containers, pods and networks known locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalState {
    /// Created containers.
    pub containers: Vec<ContainerRecord>,
    /// Pods.
    pub pods: Vec<Pod>,
    /// Networks.
    pub networks: Vec<Network>,
}

/// Resolves a reference against a list: exact ID, then name, then unique ID prefix.
fn find<'a, T>(
    items: &'a [T],
    reference: &str,
    kind: &'static str,
    id_of: impl Fn(&T) -> &str,
    name_of: impl Fn(&T) -> &str,
) -> Result<&'a T> {
    if let Some(item) = items
        .iter()
        .find(|i| id_of(i) == reference)
        .or_else(|| items.iter().find(|i| name_of(i) == reference))
    {
        return Ok(item);
    }
    if reference.is_empty() {
        return Err(SpecError::lookup(kind, reference));
    }
    let mut candidates = items.iter().filter(|i| id_of(i).starts_with(reference));
    match (candidates.next(), candidates.next()) {
        (Some(item), None) => Ok(item),
        (Some(_), Some(_)) => Err(SpecError::validation(format!(
            "{kind} ID prefix {reference:?} is ambiguous"
        ))),
        (None, _) => Err(SpecError::lookup(kind, reference)),
    }
}

impl LocalState {
    /// Loads the state index from disk; a missing file yields an empty state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading state index");
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| SpecError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persists the state index to disk atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        tracing::debug!(path = %path.display(), "saving state index");
        let io_err = |e: std::io::Error| SpecError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)
    }

    /// Adds or replaces a container record.
    pub fn add_container(&mut self, record: ContainerRecord) {
        self.containers.retain(|c| c.id() != record.id());
        self.containers.push(record);
    }

    /// Adds or replaces a pod.
    pub fn add_pod(&mut self, pod: Pod) {
        self.pods.retain(|p| p.id != pod.id);
        self.pods.push(pod);
    }

    /// Adds or replaces a network.
    pub fn add_network(&mut self, network: Network) {
        self.networks.retain(|n| n.id != network.id);
        self.networks.push(network);
    }
}

impl ContainerStore for LocalState {
    fn lookup_container(&self, reference: &str) -> Result<ContainerRecord> {
        find(&self.containers, reference, "container", |c| c.id().as_str(), ContainerRecord::name)
            .cloned()
    }
}

impl PodStore for LocalState {
    fn lookup_pod(&self, reference: &str) -> Result<Pod> {
        find(&self.pods, reference, "pod", |p| p.id.as_str(), |p| p.name.as_str()).cloned()
    }

    fn pod_status(&self, pod: &PodId) -> Result<BTreeMap<ContainerId, ContainerState>> {
        if !self.pods.iter().any(|p| &p.id == pod) {
            return Err(SpecError::lookup("pod", pod.as_str()));
        }
        Ok(self
            .containers
            .iter()
            .filter(|c| c.config.pod.as_ref() == Some(pod))
            .map(|c| (c.id().clone(), c.state))
            .collect())
    }
}

impl NetworkStore for LocalState {
    fn inspect_network(&self, reference: &str) -> Result<Network> {
        find(&self.networks, reference, "network", |n| n.id.as_str(), |n| n.name.as_str()).cloned()
    }
}
