//! The runtime facade handed to the resolution pipeline.

use std::sync::Arc;

use specwright_common::config::DaemonConfig;
use specwright_common::error::{Result, SpecError};
use specwright_image::store::ImageStore;

use crate::host::{HostEnv, ProcessEnv};
use crate::label::{LabelPolicy, SelinuxLabelPolicy};
use crate::state::LocalState;
use crate::store::{ContainerStore, NetworkStore, PodStore};

/// Collaborators and daemon defaults of one engine instance.
///
/// Cheap to clone; every collaborator is shared.
#[derive(Clone)]
pub struct Runtime {
    config: Arc<DaemonConfig>,
    images: Arc<dyn ImageStore>,
    containers: Arc<dyn ContainerStore>,
    pods: Arc<dyn PodStore>,
    networks: Arc<dyn NetworkStore>,
    labels: Arc<dyn LabelPolicy>,
    host_env: Arc<dyn HostEnv>,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// Starts building a runtime with the given daemon defaults.
    #[must_use]
    pub fn builder(config: DaemonConfig) -> RuntimeBuilder {
        RuntimeBuilder::new(config)
    }

    /// Daemon-wide defaults.
    #[must_use]
    pub fn config(&self) -> &DaemonConfig {
        &self.config
    }

    /// Image store.
    #[must_use]
    pub fn images(&self) -> &dyn ImageStore {
        self.images.as_ref()
    }

    /// Container store.
    #[must_use]
    pub fn containers(&self) -> &dyn ContainerStore {
        self.containers.as_ref()
    }

    /// Pod store.
    #[must_use]
    pub fn pods(&self) -> &dyn PodStore {
        self.pods.as_ref()
    }

    /// Network store.
    #[must_use]
    pub fn networks(&self) -> &dyn NetworkStore {
        self.networks.as_ref()
    }

    /// SELinux label policy.
    #[must_use]
    pub fn labels(&self) -> &dyn LabelPolicy {
        self.labels.as_ref()
    }

    /// Host process environment.
    #[must_use]
    pub fn host_env(&self) -> &dyn HostEnv {
        self.host_env.as_ref()
    }
}

/// Builder for a [`Runtime`].
///
/// Container, pod and network stores default to an empty [`LocalState`];
/// the host environment defaults to the current process; the label policy
/// defaults to [`SelinuxLabelPolicy`] over the container store.
pub struct RuntimeBuilder {
    config: DaemonConfig,
    images: Option<Arc<dyn ImageStore>>,
    containers: Option<Arc<dyn ContainerStore>>,
    pods: Option<Arc<dyn PodStore>>,
    networks: Option<Arc<dyn NetworkStore>>,
    labels: Option<Arc<dyn LabelPolicy>>,
    host_env: Option<Arc<dyn HostEnv>>,
}

impl std::fmt::Debug for RuntimeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RuntimeBuilder {
    /// Creates a builder with the given daemon defaults.
    #[must_use]
    pub const fn new(config: DaemonConfig) -> Self {
        Self {
            config,
            images: None,
            containers: None,
            pods: None,
            networks: None,
            labels: None,
            host_env: None,
        }
    }

    /// Sets the image store.
    #[must_use]
    pub fn images(mut self, images: Arc<dyn ImageStore>) -> Self {
        self.images = Some(images);
        self
    }

    /// Uses one local state for the container, pod and network stores.
    #[must_use]
    pub fn state(mut self, state: LocalState) -> Self {
        let state = Arc::new(state);
        self.containers = Some(state.clone());
        self.pods = Some(state.clone());
        self.networks = Some(state);
        self
    }

    /// Sets the container store.
    #[must_use]
    pub fn containers(mut self, containers: Arc<dyn ContainerStore>) -> Self {
        self.containers = Some(containers);
        self
    }

    /// Sets the pod store.
    #[must_use]
    pub fn pods(mut self, pods: Arc<dyn PodStore>) -> Self {
        self.pods = Some(pods);
        self
    }

    /// Sets the network store.
    #[must_use]
    pub fn networks(mut self, networks: Arc<dyn NetworkStore>) -> Self {
        self.networks = Some(networks);
        self
    }

    /// Sets the label policy.
    #[must_use]
    pub fn labels(mut self, labels: Arc<dyn LabelPolicy>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Sets the host environment provider.
    #[must_use]
    pub fn host_env(mut self, host_env: Arc<dyn HostEnv>) -> Self {
        self.host_env = Some(host_env);
        self
    }

    /// Builds the runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Config`] if no image store was set.
    pub fn build(self) -> Result<Runtime> {
        let images = self.images.ok_or_else(|| SpecError::Config {
            message: "an image store is required".to_string(),
        })?;
        let empty = Arc::new(LocalState::default());
        let containers: Arc<dyn ContainerStore> = match self.containers {
            Some(containers) => containers,
            None => empty.clone(),
        };
        let pods: Arc<dyn PodStore> = match self.pods {
            Some(pods) => pods,
            None => empty.clone(),
        };
        let networks: Arc<dyn NetworkStore> = match self.networks {
            Some(networks) => networks,
            None => empty,
        };
        let labels: Arc<dyn LabelPolicy> = match self.labels {
            Some(labels) => labels,
            None => Arc::new(SelinuxLabelPolicy::new(
                self.config.selinux,
                containers.clone(),
            )),
        };
        let host_env: Arc<dyn HostEnv> = match self.host_env {
            Some(host_env) => host_env,
            None => Arc::new(ProcessEnv),
        };
        Ok(Runtime {
            images,
            containers,
            pods,
            networks,
            labels,
            host_env,
            config: Arc::new(self.config),
        })
    }
}
