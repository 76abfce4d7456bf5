//! Health-check merge.
//!
//! The image's health check is the base. Each non-zero field of the
//! caller's override replaces the image's value on its own; zero means
//! "inherit". A disabled interval is kept as disabled and never defaulted.

use std::time::Duration;

use specwright_common::constants::{
    DEFAULT_HEALTH_INTERVAL, DEFAULT_HEALTH_RETRIES, DEFAULT_HEALTH_START_PERIOD,
    DEFAULT_HEALTH_TIMEOUT,
};
use specwright_spec::health::{HealthConfig, HealthInterval};

/// Merges the caller's overrides into the image's health check and fills
/// zero fields with defaults.
///
/// Returns `None` when the image declares no health check.
#[must_use]
pub fn apply_health_overrides(
    image: Option<&HealthConfig>,
    overrides: Option<&HealthConfig>,
) -> Option<HealthConfig> {
    let mut merged = image?.clone();

    if let Some(overrides) = overrides {
        if !overrides.interval.is_unset() {
            merged.interval = overrides.interval;
        }
        if overrides.retries != 0 {
            merged.retries = overrides.retries;
        }
        if !overrides.timeout.is_zero() {
            merged.timeout = overrides.timeout;
        }
        if !overrides.start_period.is_zero() {
            merged.start_period = overrides.start_period;
        }
    }

    if merged.timeout.is_zero() {
        merged.timeout = DEFAULT_HEALTH_TIMEOUT;
    }
    if merged.interval == HealthInterval::Every(Duration::ZERO) {
        merged.interval = HealthInterval::Every(DEFAULT_HEALTH_INTERVAL);
    }
    if merged.retries == 0 {
        merged.retries = DEFAULT_HEALTH_RETRIES;
    }
    if merged.start_period.is_zero() {
        merged.start_period = DEFAULT_HEALTH_START_PERIOD;
    }

    tracing::debug!(
        interval = ?merged.interval,
        timeout = ?merged.timeout,
        retries = merged.retries,
        "health check resolved"
    );
    Some(merged)
}
