//! Volume and mount declarations.

use serde::{Deserialize, Serialize};

/// A named volume mounted into the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedVolume {
    /// Volume name; empty for an anonymous volume.
    pub name: String,
    /// Destination inside the container.
    pub dest: String,
    /// Mount options.
    pub options: Vec<String>,
}

/// An image mounted into the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageVolume {
    /// Image reference or ID.
    pub source: String,
    /// Destination inside the container.
    pub destination: String,
    /// Whether writes go to an overlay on top of the image.
    pub read_write: bool,
}

/// A host directory mounted through an overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayVolume {
    /// Host directory.
    pub source: String,
    /// Destination inside the container.
    pub destination: String,
    /// Overlay options.
    pub options: Vec<String>,
}

/// A mount as recorded in the container's generated runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mount {
    /// Destination inside the container.
    pub destination: String,
    /// Mount type (`bind`, `tmpfs`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Resolved source on the host.
    pub source: String,
    /// Mount options.
    pub options: Vec<String>,
}

impl Mount {
    /// Creates a bind mount.
    #[must_use]
    pub fn bind(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            kind: "bind".to_string(),
            source: source.into(),
            options: vec!["rbind".to_string()],
        }
    }
}
