//! Resource-limit defaults and cross-checks.

use specwright_common::config::{CgroupsMode, DaemonConfig};
use specwright_common::constants::DEFAULT_CPU_PERIOD;
use specwright_spec::DraftSpec;

/// Fills the pids limit from the daemon default.
///
/// Skipped when cgroups are disabled, the daemon limit is not positive, or
/// the caller already set one.
pub fn init_resource_limits(draft: &mut DraftSpec, config: &DaemonConfig) {
    if draft.cgroups_mode == Some(CgroupsMode::Disabled) || config.pids_limit <= 0 {
        return;
    }
    let limits = draft.resource_limits.get_or_insert_with(Default::default);
    if limits.pids.is_none() {
        limits.pids = Some(config.pids_limit);
    }
}

/// Drops or completes inconsistent resource limits, returning one warning
/// per adjustment.
pub fn verify_resources(draft: &mut DraftSpec) -> Vec<String> {
    let mut warnings = Vec::new();
    let cgroups_disabled = draft.cgroups_mode == Some(CgroupsMode::Disabled);
    let Some(limits) = draft.resource_limits.as_mut() else {
        return warnings;
    };

    if let (Some(memory), Some(reservation)) = (limits.memory, limits.memory_reservation) {
        if memory > 0 && reservation > memory {
            limits.memory_reservation = None;
            warnings.push(format!(
                "Memory reservation {reservation} exceeds the memory limit {memory}; reservation discarded"
            ));
        }
    }

    if let (Some(memory), Some(swap)) = (limits.memory, limits.memory_swap) {
        if memory > 0 && swap > 0 && swap < memory {
            limits.memory_swap = None;
            warnings.push(format!(
                "Memory swap limit {swap} is lower than the memory limit {memory}; swap limit discarded"
            ));
        }
    }

    if limits.cpu_quota.is_some_and(|q| q > 0) && limits.cpu_period.is_none() {
        limits.cpu_period = Some(DEFAULT_CPU_PERIOD);
        warnings.push(format!(
            "CPU quota set without a period; using the default period of {DEFAULT_CPU_PERIOD}us"
        ));
    }

    if cgroups_disabled && limits.pids.is_some() {
        limits.pids = None;
        warnings.push("Pids limit discarded because cgroups are disabled".to_string());
    }

    warnings
}
