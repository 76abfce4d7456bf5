//! Domain primitive types used across the specwright workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the inner string representation.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the 12-character abbreviated form used in listings.
            #[must_use]
            pub fn short(&self) -> &str {
                self.0.get(..12).unwrap_or(&self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

id_type!(
    /// Unique identifier for a container instance.
    ContainerId
);

id_type!(
    /// Unique identifier for a pod.
    PodId
);

id_type!(
    /// Unique identifier for a container image.
    ImageId
);

/// Resource limits requested for a container.
///
/// Every field is optional so that "not requested" stays distinct from an
/// explicit zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLimits {
    /// Maximum number of processes.
    pub pids: Option<i64>,
    /// Memory limit in bytes.
    pub memory: Option<i64>,
    /// Soft memory limit in bytes.
    pub memory_reservation: Option<i64>,
    /// Memory plus swap limit in bytes.
    pub memory_swap: Option<i64>,
    /// CPU CFS quota in microseconds.
    pub cpu_quota: Option<i64>,
    /// CPU CFS period in microseconds.
    pub cpu_period: Option<u64>,
    /// CPU shares (relative weight).
    pub cpu_shares: Option<u64>,
}

/// Lifecycle state of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    /// Container exists in the state index but has no runtime resources.
    Configured,
    /// Container has been created but not yet started.
    Created,
    /// Container is actively running.
    Running,
    /// Container processes are frozen.
    Paused,
    /// Container has been stopped.
    Stopped,
    /// Container process has exited.
    Exited,
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured => write!(f, "configured"),
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Stopped => write!(f, "stopped"),
            Self::Exited => write!(f, "exited"),
        }
    }
}
