//! Health-check parameters.
//!
//! Durations serialize as integer nanoseconds. The interval is signed on
//! the wire: a negative value means the caller disabled periodic checks.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How often a health check runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthInterval {
    /// Run at this period; zero means "not specified".
    Every(Duration),
    /// Periodic checks were explicitly disabled.
    Disabled,
}

impl Default for HealthInterval {
    fn default() -> Self {
        Self::Every(Duration::ZERO)
    }
}

impl HealthInterval {
    /// Returns `true` when no interval was specified.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        *self == Self::Every(Duration::ZERO)
    }

    /// Returns the effective period; zero when disabled.
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        match self {
            Self::Every(d) => *d,
            Self::Disabled => Duration::ZERO,
        }
    }

    fn from_nanos(nanos: i64) -> Self {
        u64::try_from(nanos).map_or(Self::Disabled, |n| Self::Every(Duration::from_nanos(n)))
    }

    fn as_nanos(self) -> i64 {
        match self {
            Self::Every(d) => i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
            Self::Disabled => -1,
        }
    }
}

impl Serialize for HealthInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_nanos())
    }
}

impl<'de> Deserialize<'de> for HealthInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::from_nanos)
    }
}

/// Health-check configuration of an image or container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Check command; `["NONE"]` disables an inherited check.
    pub test: Vec<String>,
    /// Period between checks.
    pub interval: HealthInterval,
    /// Maximum duration of one check.
    #[serde(with = "nanos")]
    pub timeout: Duration,
    /// Grace period during which failures do not count.
    #[serde(with = "nanos")]
    pub start_period: Duration,
    /// Consecutive failures before the container is unhealthy.
    pub retries: u32,
}

impl HealthConfig {
    /// Creates a configuration running the given check command.
    #[must_use]
    pub fn with_test(test: Vec<String>) -> Self {
        Self {
            test,
            ..Self::default()
        }
    }
}

/// What happens to a container whose health check fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthOnFailureAction {
    /// Only record the failure.
    #[default]
    None,
    /// Kill the container.
    Kill,
    /// Restart the container.
    Restart,
    /// Stop the container.
    Stop,
}

/// Serde helpers for durations stored as integer nanoseconds.
pub mod nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes a duration as nanoseconds.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_nanos()).unwrap_or(u64::MAX))
    }

    /// Deserializes a duration from nanoseconds.
    ///
    /// # Errors
    ///
    /// Propagates deserializer errors.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_nanos)
    }
}
