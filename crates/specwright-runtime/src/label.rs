//! SELinux label defaults.
//!
//! Containers that share the host's PID or IPC namespace run unconfined;
//! containers joining another container's PID or IPC namespace must run
//! with that container's process label.

use std::sync::Arc;

use specwright_common::error::{Result, SpecError};
use specwright_spec::Namespace;

use crate::store::ContainerStore;

/// Computes default label options for a container.
pub trait LabelPolicy: Send + Sync {
    /// Returns label options for the given PID and IPC namespace choices.
    ///
    /// # Errors
    ///
    /// Returns an error if a joined container cannot be inspected or its
    /// process label is malformed.
    fn label_opts(&self, pid_ns: &Namespace, ipc_ns: &Namespace) -> Result<Vec<String>>;
}

/// Label policy of an SELinux-enabled host.
pub struct SelinuxLabelPolicy {
    enabled: bool,
    containers: Arc<dyn ContainerStore>,
}

impl std::fmt::Debug for SelinuxLabelPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelinuxLabelPolicy")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl SelinuxLabelPolicy {
    /// Creates a policy; a disabled policy never yields options.
    #[must_use]
    pub fn new(enabled: bool, containers: Arc<dyn ContainerStore>) -> Self {
        Self {
            enabled,
            containers,
        }
    }

    fn dup_label(&self, reference: &str) -> Result<Vec<String>> {
        let record = self.containers.lookup_container(reference)?;
        let Some(label) = record.config.process_label.filter(|l| !l.is_empty()) else {
            return Ok(Vec::new());
        };
        let mut parts = label.splitn(4, ':');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(user), Some(role), Some(kind), Some(level)) => Ok(vec![
                format!("user:{user}"),
                format!("role:{role}"),
                format!("type:{kind}"),
                format!("level:{level}"),
            ]),
            _ => Err(SpecError::validation(format!(
                "process label {label:?} of container {reference} is not user:role:type:level"
            ))),
        }
    }
}

impl LabelPolicy for SelinuxLabelPolicy {
    fn label_opts(&self, pid_ns: &Namespace, ipc_ns: &Namespace) -> Result<Vec<String>> {
        if !self.enabled {
            return Ok(Vec::new());
        }
        if pid_ns.is_host() || ipc_ns.is_host() {
            return Ok(vec!["disable".to_string()]);
        }
        if let Some(reference) = pid_ns.container() {
            return self.dup_label(reference);
        }
        if let Some(reference) = ipc_ns.container() {
            return self.dup_label(reference);
        }
        Ok(Vec::new())
    }
}
