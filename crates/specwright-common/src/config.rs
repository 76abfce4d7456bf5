//! Daemon-wide configuration: the site defaults every resolution pass reads.
//!
//! The configuration is loaded once (from YAML or built-in defaults) and
//! treated as an immutable snapshot for the duration of a resolution pass.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{Result, SpecError};

/// How a container's cgroups are managed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CgroupsMode {
    /// The runtime creates and manages cgroups.
    #[default]
    Enabled,
    /// No cgroups are created; resource limits cannot be enforced.
    Disabled,
    /// The monitor process is not placed in a cgroup.
    NoConmon,
    /// The container is split into the caller's cgroup.
    Split,
}

impl fmt::Display for CgroupsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
            Self::NoConmon => write!(f, "no-conmon"),
            Self::Split => write!(f, "split"),
        }
    }
}

/// Treatment of `VOLUME` declarations found in an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageVolumeMode {
    /// Back image volumes with anonymous named volumes.
    #[default]
    Anonymous,
    /// Bind-mount image volumes from the container's storage.
    Bind,
    /// Back image volumes with tmpfs.
    Tmpfs,
    /// Ignore image volumes.
    Ignore,
}

/// Root configuration of the daemon, as read from its configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Default environment, as `KEY=VALUE` entries.
    pub env: Vec<String>,
    /// Seed the default environment with the full host environment.
    pub env_host: bool,
    /// Seed the default environment with the host's proxy variables.
    pub http_proxy: bool,
    /// Proxy variable names eligible for pass-through.
    pub proxy_env: Vec<String>,
    /// Default annotations, as `KEY=VALUE` entries.
    pub annotations: Vec<String>,
    /// Default cgroups mode.
    pub cgroups: CgroupsMode,
    /// Default log driver.
    pub log_driver: String,
    /// Log tag applied to containers using a tag-aware driver.
    pub log_tag: Option<String>,
    /// Default treatment of image volumes.
    pub image_volume_mode: ImageVolumeMode,
    /// Default seccomp profile path.
    pub seccomp_profile: String,
    /// Default pids limit; zero disables the default.
    pub pids_limit: i64,
    /// Whether SELinux labeling is active on this host.
    pub selinux: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            env: Vec::new(),
            env_host: false,
            http_proxy: true,
            proxy_env: constants::PROXY_ENV.iter().map(|s| (*s).to_string()).collect(),
            annotations: Vec::new(),
            cgroups: CgroupsMode::Enabled,
            log_driver: constants::DEFAULT_LOG_DRIVER.to_string(),
            log_tag: None,
            image_volume_mode: ImageVolumeMode::Anonymous,
            seccomp_profile: constants::DEFAULT_SECCOMP_PATH.to_string(),
            pids_limit: constants::DEFAULT_PIDS_LIMIT,
            selinux: false,
        }
    }
}

impl DaemonConfig {
    /// Loads the configuration from a YAML file.
    ///
    /// Keys missing from the file keep their built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SpecError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| SpecError::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        tracing::info!(path = %path.display(), "daemon configuration loaded");
        Ok(config)
    }

    /// Returns the configured default environment as a map.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry has no `=` or an empty key.
    pub fn default_env(&self) -> Result<BTreeMap<String, String>> {
        let mut env = BTreeMap::new();
        for entry in &self.env {
            match entry.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    let _ = env.insert(key.to_string(), value.to_string());
                }
                _ => {
                    return Err(SpecError::Config {
                        message: format!("environment entry {entry:?} must be KEY=VALUE"),
                    });
                }
            }
        }
        Ok(env)
    }

    /// Returns the configured default annotations as key/value pairs.
    ///
    /// An entry without `=` yields an annotation with an empty value.
    pub fn default_annotations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.annotations
            .iter()
            .map(|a| a.split_once('=').unwrap_or((a.as_str(), "")))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_include_proxy_allow_list() {
        let config = DaemonConfig::default();
        assert!(config.proxy_env.iter().any(|v| v == "HTTPS_PROXY"));
        assert_eq!(config.cgroups, CgroupsMode::Enabled);
        assert_eq!(config.pids_limit, constants::DEFAULT_PIDS_LIMIT);
    }

    #[test]
    fn default_env_parses_entries() {
        let config = DaemonConfig {
            env: vec!["A=1".into(), "B=x=y".into(), "C=".into()],
            ..DaemonConfig::default()
        };
        let env = config.default_env().expect("should parse");
        assert_eq!(env.get("A").map(String::as_str), Some("1"));
        assert_eq!(env.get("B").map(String::as_str), Some("x=y"));
        assert_eq!(env.get("C").map(String::as_str), Some(""));
    }

    #[test]
    fn default_env_rejects_entry_without_equals() {
        let config = DaemonConfig {
            env: vec!["LONELY".into()],
            ..DaemonConfig::default()
        };
        assert!(config.default_env().is_err());
    }

    #[test]
    fn annotations_without_value_are_empty() {
        let config = DaemonConfig {
            annotations: vec!["a=1".into(), "flag".into()],
            ..DaemonConfig::default()
        };
        let pairs: Vec<_> = config.default_annotations().collect();
        assert_eq!(pairs, vec![("a", "1"), ("flag", "")]);
    }

    #[test]
    fn load_merges_file_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "log_driver: k8s-file\ncgroups: no-conmon\nenv:\n  - TZ=UTC")
            .expect("write");
        let config = DaemonConfig::load(file.path()).expect("should load");
        assert_eq!(config.log_driver, "k8s-file");
        assert_eq!(config.cgroups, CgroupsMode::NoConmon);
        assert_eq!(config.env, vec!["TZ=UTC"]);
        assert_eq!(config.seccomp_profile, constants::DEFAULT_SECCOMP_PATH);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = DaemonConfig::load(Path::new("/nonexistent/specwright.yaml"))
            .expect_err("should fail");
        assert!(matches!(err, SpecError::Io { .. }));
    }
}
