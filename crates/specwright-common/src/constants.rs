//! System-wide constants and built-in defaults.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// Application name used in CLI output and the baseline `container` variable.
pub const APP_NAME: &str = "specwright";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "specwright";

/// Data directory used when no per-user directory can be created.
pub const SYSTEM_DATA_DIR: &str = "/var/lib/specwright";

/// Prefers `$HOME/.specwright`, falling back to the system directory.
fn resolve_data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        let user_dir = PathBuf::from(home).join(".specwright");
        if std::fs::create_dir_all(&user_dir).is_ok() {
            return user_dir;
        }
    }
    PathBuf::from(SYSTEM_DATA_DIR)
}

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the resolved data directory for this session.
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(resolve_data_dir)
}

/// Returns the default path of the local container and pod state.
pub fn default_state_file() -> PathBuf {
    data_dir().join("state.json")
}

/// Returns the default path of the daemon configuration file.
pub fn default_config_file() -> PathBuf {
    data_dir().join("specwright.yaml")
}

/// Default health check interval.
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(30);

/// Default health check timeout.
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default grace period before failed health checks count.
pub const DEFAULT_HEALTH_START_PERIOD: Duration = Duration::from_secs(5);

/// Default number of consecutive failures before a container is unhealthy.
pub const DEFAULT_HEALTH_RETRIES: u32 = 3;

/// Default destination of health check logs.
pub const DEFAULT_HEALTH_LOG_DESTINATION: &str = "local";

/// Default number of health check results kept in the log.
pub const DEFAULT_HEALTH_MAX_LOG_COUNT: u32 = 5;

/// Default maximum size, in characters, of one health check log entry.
pub const DEFAULT_HEALTH_MAX_LOG_SIZE: u32 = 500;

/// Annotation carrying the namespace-sharing anchor of a pod member.
pub const SANDBOX_ID_ANNOTATION: &str = "io.kubernetes.cri.sandbox-id";

/// Default seccomp policy installed by the distribution.
pub const DEFAULT_SECCOMP_PATH: &str = "/usr/share/containers/seccomp.json";

/// Shared-memory directory of the host IPC namespace.
pub const HOST_SHM_DIR: &str = "/dev/shm";

/// Log driver that does not accept a log tag.
pub const JSON_LOG_DRIVER: &str = "json-file";

/// Log driver used when neither caller nor daemon picks one.
pub const DEFAULT_LOG_DRIVER: &str = "journald";

/// Value injected into `TERM` for terminal sessions without one.
pub const DEFAULT_TERM: &str = "xterm";

/// Search path every container starts from.
pub const DEFAULT_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// Default pids limit applied by the daemon.
pub const DEFAULT_PIDS_LIMIT: i64 = 2048;

/// CPU CFS period applied when only a quota is requested, in microseconds.
pub const DEFAULT_CPU_PERIOD: u64 = 100_000;

/// Proxy variables copied from the host when proxy pass-through is requested.
pub const PROXY_ENV: [&str; 8] = [
    "http_proxy",
    "https_proxy",
    "ftp_proxy",
    "no_proxy",
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "FTP_PROXY",
    "NO_PROXY",
];

/// Marker appended to the names of cloned containers and pods.
pub const CLONE_SUFFIX: &str = "-clone";
