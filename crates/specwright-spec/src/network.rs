//! Network configuration recorded for a created container.
//!
//! The stored network mode is a colon-delimited descriptor on disk
//! (`bridge`, `slirp4netns:port_handler=slirp4netns`, `container:<id>`, ...).
//! In memory it is the tagged [`NetworkMode`]; the string form only exists
//! at the serialization boundary.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use specwright_common::error::SpecError;

/// Network mode a container was created with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NetworkMode {
    /// Runtime default.
    #[default]
    Default,
    /// Bridged networking.
    Bridge,
    /// The host network stack.
    Host,
    /// A loopback-only network namespace.
    None,
    /// A private network namespace.
    Private,
    /// slirp4netns with an optional option string.
    Slirp4netns(Option<String>),
    /// pasta with an optional option string.
    Pasta(Option<String>),
    /// A network namespace at the given path (`ns:<path>`).
    Path(String),
    /// The network namespace of another container (`container:<id>`).
    Container(String),
    /// The network namespace of a pod (`pod:<id>`).
    Pod(String),
}

impl NetworkMode {
    /// Returns `true` for modes that publish ports through the runtime.
    #[must_use]
    pub const fn carries_ports(&self) -> bool {
        matches!(self, Self::Bridge | Self::Slirp4netns(_) | Self::Pasta(_))
    }
}

fn required_ref(kind: &str, value: &str) -> Result<String, SpecError> {
    if value.is_empty() {
        return Err(SpecError::validation(format!(
            "network mode {kind} requires a reference"
        )));
    }
    Ok(value.to_string())
}

impl FromStr for NetworkMode {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind, Some(arg)),
            None => (s, None),
        };
        let options = || arg.filter(|a| !a.is_empty()).map(str::to_string);
        match (kind, arg) {
            ("" | "default", None) => Ok(Self::Default),
            ("bridge", None) => Ok(Self::Bridge),
            ("host", None) => Ok(Self::Host),
            ("none", None) => Ok(Self::None),
            ("private", None) => Ok(Self::Private),
            ("slirp4netns", _) => Ok(Self::Slirp4netns(options())),
            ("pasta", _) => Ok(Self::Pasta(options())),
            ("ns", Some(path)) => required_ref(kind, path).map(Self::Path),
            ("container", Some(id)) => required_ref(kind, id).map(Self::Container),
            ("pod", Some(id)) => required_ref(kind, id).map(Self::Pod),
            _ => Err(SpecError::validation(format!("unknown network mode {s:?}"))),
        }
    }
}

impl TryFrom<String> for NetworkMode {
    type Error = SpecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NetworkMode> for String {
    fn from(mode: NetworkMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Bridge => write!(f, "bridge"),
            Self::Host => write!(f, "host"),
            Self::None => write!(f, "none"),
            Self::Private => write!(f, "private"),
            Self::Slirp4netns(None) => write!(f, "slirp4netns"),
            Self::Slirp4netns(Some(opts)) => write!(f, "slirp4netns:{opts}"),
            Self::Pasta(None) => write!(f, "pasta"),
            Self::Pasta(Some(opts)) => write!(f, "pasta:{opts}"),
            Self::Path(path) => write!(f, "ns:{path}"),
            Self::Container(id) => write!(f, "container:{id}"),
            Self::Pod(id) => write!(f, "pod:{id}"),
        }
    }
}

/// A published port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortMapping {
    /// Host address to bind; all addresses when unset.
    pub host_ip: Option<String>,
    /// Port inside the container.
    pub container_port: u16,
    /// Port on the host; chosen by the runtime when zero.
    pub host_port: u16,
    /// Number of consecutive ports mapped, starting at the given ports.
    pub range: u16,
    /// Comma-separated protocols (`tcp`, `udp`, `sctp`).
    pub protocol: String,
}

/// Per-network attachment options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkOptions {
    /// DNS aliases of the container on this network.
    pub aliases: Vec<String>,
    /// Static addresses requested on this network.
    pub static_ips: Vec<String>,
    /// Interface name inside the container.
    pub interface_name: Option<String>,
}

/// Exposed ports keyed by port number, protocols comma-joined.
pub type ExposedPorts = BTreeMap<u16, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slirp_with_options() {
        let mode: NetworkMode = "slirp4netns:port_handler=slirp4netns".parse().expect("parse");
        assert_eq!(
            mode,
            NetworkMode::Slirp4netns(Some("port_handler=slirp4netns".into()))
        );
    }

    #[test]
    fn slirp_options_keep_later_colons() {
        let mode: NetworkMode = "slirp4netns:cidr=10.0.2.0/24,outbound_addr=a:b"
            .parse()
            .expect("parse");
        assert_eq!(mode.to_string(), "slirp4netns:cidr=10.0.2.0/24,outbound_addr=a:b");
    }

    #[test]
    fn parses_reference_modes() {
        assert_eq!(
            "container:abc".parse::<NetworkMode>().expect("parse"),
            NetworkMode::Container("abc".into())
        );
        assert_eq!(
            "ns:/run/netns/blue".parse::<NetworkMode>().expect("parse"),
            NetworkMode::Path("/run/netns/blue".into())
        );
        assert_eq!(
            "pod:p1".parse::<NetworkMode>().expect("parse"),
            NetworkMode::Pod("p1".into())
        );
    }

    #[test]
    fn empty_string_is_default() {
        assert_eq!("".parse::<NetworkMode>().expect("parse"), NetworkMode::Default);
    }

    #[test]
    fn rejects_missing_reference() {
        assert!("container:".parse::<NetworkMode>().is_err());
        assert!("container".parse::<NetworkMode>().is_err());
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!("wireguard".parse::<NetworkMode>().is_err());
        assert!("host:extra".parse::<NetworkMode>().is_err());
    }

    #[test]
    fn serializes_as_descriptor_string() {
        let json = serde_json::to_string(&NetworkMode::Container("abc".into())).expect("json");
        assert_eq!(json, "\"container:abc\"");
        let back: NetworkMode = serde_json::from_str(&json).expect("json");
        assert_eq!(back, NetworkMode::Container("abc".into()));
    }

    #[test]
    fn only_routed_modes_carry_ports() {
        assert!(NetworkMode::Bridge.carries_ports());
        assert!(NetworkMode::Pasta(None).carries_ports());
        assert!(!NetworkMode::Private.carries_ports());
    }
}
