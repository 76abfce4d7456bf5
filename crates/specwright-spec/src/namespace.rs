//! Namespace declarations for the six isolation domains.
//!
//! A [`Namespace`] says how one domain is configured: left to the runtime
//! default, made private, shared with the host, joined from another
//! container or pod, or (for networking) attached to a specific network
//! stack. Only the variants that need a reference carry one, so a value can
//! never appear on a mode that does not take it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the isolation domains a container can configure independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceKind {
    /// Process ID namespace.
    Pid,
    /// Network namespace.
    Net,
    /// Cgroup namespace.
    Cgroup,
    /// System V IPC and POSIX message queue namespace.
    Ipc,
    /// Hostname and domain name namespace.
    Uts,
    /// User and group ID namespace.
    User,
}

impl NamespaceKind {
    /// Every domain, in the order the stored configuration records them.
    pub const ALL: [Self; 6] = [
        Self::Pid,
        Self::Net,
        Self::Cgroup,
        Self::Ipc,
        Self::Uts,
        Self::User,
    ];
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pid => write!(f, "pid"),
            Self::Net => write!(f, "net"),
            Self::Cgroup => write!(f, "cgroup"),
            Self::Ipc => write!(f, "ipc"),
            Self::Uts => write!(f, "uts"),
            Self::User => write!(f, "user"),
        }
    }
}

/// The mode of a [`Namespace`] with any reference stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceMode {
    /// Runtime default for the domain.
    Default,
    /// A new namespace not shared with anything.
    Private,
    /// The host's namespace.
    Host,
    /// A namespace with nothing configured inside it.
    None,
    /// A namespace identified by a filesystem path.
    Path,
    /// The namespace of another container.
    FromContainer,
    /// The namespace of the container's pod.
    FromPod,
    /// A bridged network stack.
    Bridge,
    /// User-mode networking through slirp4netns.
    Slirp,
    /// User-mode networking through pasta.
    Pasta,
    /// A user namespace mapping the caller's ID into the container.
    KeepId,
}

impl fmt::Display for NamespaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Private => "private",
            Self::Host => "host",
            Self::None => "none",
            Self::Path => "path",
            Self::FromContainer => "container",
            Self::FromPod => "pod",
            Self::Bridge => "bridge",
            Self::Slirp => "slirp4netns",
            Self::Pasta => "pasta",
            Self::KeepId => "keep-id",
        };
        f.write_str(name)
    }
}

/// Configuration of one isolation domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "nsmode", content = "value", rename_all = "kebab-case")]
pub enum Namespace {
    /// Runtime default for the domain.
    #[default]
    Default,
    /// A new namespace not shared with anything.
    Private,
    /// The host's namespace.
    Host,
    /// A namespace with nothing configured inside it.
    None,
    /// A namespace identified by a filesystem path.
    Path(String),
    /// The namespace of the named or identified container.
    #[serde(rename = "container")]
    FromContainer(String),
    /// The namespace of the named or identified pod.
    #[serde(rename = "pod")]
    FromPod(String),
    /// A bridged network stack.
    Bridge,
    /// slirp4netns networking with an optional option string.
    #[serde(rename = "slirp4netns")]
    Slirp(Option<String>),
    /// pasta networking.
    Pasta,
    /// Keep the caller's user ID inside the container.
    KeepId,
}

impl Namespace {
    /// Returns the mode of this declaration.
    #[must_use]
    pub const fn mode(&self) -> NamespaceMode {
        match self {
            Self::Default => NamespaceMode::Default,
            Self::Private => NamespaceMode::Private,
            Self::Host => NamespaceMode::Host,
            Self::None => NamespaceMode::None,
            Self::Path(_) => NamespaceMode::Path,
            Self::FromContainer(_) => NamespaceMode::FromContainer,
            Self::FromPod(_) => NamespaceMode::FromPod,
            Self::Bridge => NamespaceMode::Bridge,
            Self::Slirp(_) => NamespaceMode::Slirp,
            Self::Pasta => NamespaceMode::Pasta,
            Self::KeepId => NamespaceMode::KeepId,
        }
    }

    /// Returns the reference carried by this declaration, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Path(v) | Self::FromContainer(v) | Self::FromPod(v) => Some(v),
            Self::Slirp(v) => v.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` for the host namespace.
    #[must_use]
    pub const fn is_host(&self) -> bool {
        matches!(self, Self::Host)
    }

    /// Returns `true` when the runtime default applies.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Returns the container whose namespace is joined, if any.
    #[must_use]
    pub fn container(&self) -> Option<&str> {
        match self {
            Self::FromContainer(id) => Some(id),
            _ => None,
        }
    }

    /// Returns `true` when a network namespace in this mode can publish ports.
    #[must_use]
    pub const fn supports_port_mappings(&self) -> bool {
        matches!(self, Self::Bridge | Self::Slirp(_) | Self::Pasta)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(value) => write!(f, "{}:{value}", self.mode()),
            None => write!(f, "{}", self.mode()),
        }
    }
}
