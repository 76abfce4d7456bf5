//! The default cascade: completes a draft from its image, the daemon
//! configuration and its pod.
//!
//! Steps run in a fixed order and leave already-complete input unchanged.
//! A fatal error stops the cascade; warnings are collected and returned
//! with the completed draft.

use std::collections::BTreeMap;

use specwright_common::constants::{JSON_LOG_DRIVER, SANDBOX_ID_ANNOTATION};
use specwright_common::error::{Result, SpecError};
use specwright_common::types::ContainerState;
use specwright_image::resolver::image_from_spec;
use specwright_image::store::ImageData;
use specwright_runtime::Runtime;
use specwright_spec::DraftSpec;
use specwright_spec::signal::parse_signal;

use crate::env::resolve_env;
use crate::health::apply_health_overrides;
use crate::resources::{init_resource_limits, verify_resources};

fn is_blank(value: Option<&String>) -> bool {
    value.is_none_or(String::is_empty)
}

/// Fills every gap of `draft` the caller left open.
///
/// Returns the warnings raised along the way. On error the draft may be
/// partially completed and must be discarded.
///
/// # Errors
///
/// - [`SpecError::Lookup`] if the image or pod cannot be found.
/// - [`SpecError::Validation`] for a malformed stop signal, image
///   environment entry, or merge directive.
/// - [`SpecError::PolicyConflict`] when an init container targets a pod
///   with a running member.
pub fn complete_spec(runtime: &Runtime, draft: &mut DraftSpec) -> Result<Vec<String>> {
    let config = runtime.config();
    let image = image_from_spec(runtime.images(), draft)?;
    let image_data = image.as_ref().map(|i| &i.data);

    if let Some(data) = image_data {
        if !draft.defines_health_test() {
            draft.health_config =
                apply_health_overrides(data.health_check.as_ref(), draft.health_config.as_ref());
        }
        inherit_stop_signal(draft, data)?;
    }

    draft.env = resolve_env(runtime, draft, image_data)?;

    if let Some(data) = image_data {
        for (key, value) in &data.labels {
            let _ = draft
                .labels
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    let mut annotations = pod_annotations(runtime, draft)?;
    for (key, value) in config.default_annotations() {
        let _ = annotations.insert(key.to_string(), value.to_string());
    }
    annotations.extend(std::mem::take(&mut draft.annotations));
    draft.annotations = annotations;

    if is_blank(draft.seccomp_profile_path.as_ref()) {
        draft.seccomp_profile_path = Some(config.seccomp_profile.clone());
    }

    if is_blank(draft.user.as_ref()) {
        if let Some(user) = image_data.and_then(|d| d.user.clone()) {
            draft.user = Some(user);
        }
    }

    if draft.selinux_opts.is_empty() {
        match runtime.labels().label_opts(&draft.pid_ns, &draft.ipc_ns) {
            Ok(opts) => draft.selinux_opts = opts,
            Err(e) => tracing::warn!(error = %e, "default label options unavailable"),
        }
    }

    let _ = draft.cgroups_mode.get_or_insert(config.cgroups);
    init_resource_limits(draft, config);

    let log = draft.log_configuration.get_or_insert_with(Default::default);
    if is_blank(log.driver.as_ref()) {
        log.driver = Some(config.log_driver.clone());
    }
    if let Some(tag) = config.log_tag.as_ref().filter(|t| !t.is_empty()) {
        if log.driver.as_deref() == Some(JSON_LOG_DRIVER) {
            tracing::warn!(log_tag = %tag, driver = JSON_LOG_DRIVER, "log tag not allowed with this log driver");
        } else {
            let _ = log
                .options
                .entry("tag".to_string())
                .or_insert_with(|| tag.clone());
        }
    }

    let mut warnings = verify_resources(draft);

    if !draft.port_mappings.is_empty()
        && !draft.net_ns.is_default()
        && !draft.net_ns.supports_port_mappings()
    {
        warnings.push(format!(
            "Port mappings have been discarded because \"{}\" network namespace mode does not support them",
            draft.net_ns.mode()
        ));
    }

    let _ = draft.image_volume_mode.get_or_insert(config.image_volume_mode);

    tracing::info!(
        name = draft.name.as_deref().unwrap_or_default(),
        image = image.as_ref().map(|i| i.resolved_name.as_str()),
        warnings = warnings.len(),
        "spec completed"
    );
    Ok(warnings)
}

fn inherit_stop_signal(draft: &mut DraftSpec, image: &ImageData) -> Result<()> {
    if draft.stop_signal.is_some() {
        return Ok(());
    }
    if let Some(name) = image.stop_signal.as_deref().filter(|s| !s.is_empty()) {
        draft.stop_signal = Some(parse_signal(name)?);
    }
    Ok(())
}

/// Returns the sandbox annotation of a pod member, after checking that an
/// init container is not added to a running pod.
fn pod_annotations(runtime: &Runtime, draft: &DraftSpec) -> Result<BTreeMap<String, String>> {
    let mut annotations = BTreeMap::new();
    let Some(reference) = draft.pod.as_deref().filter(|p| !p.is_empty()) else {
        return Ok(annotations);
    };

    let pod = runtime.pods().lookup_pod(reference)?;
    let sandbox = pod
        .infra_container_id
        .as_ref()
        .map_or_else(|| pod.id.to_string(), ToString::to_string);
    let _ = annotations.insert(SANDBOX_ID_ANNOTATION.to_string(), sandbox);

    if draft.init_container_type.is_some() {
        let statuses = runtime.pods().pod_status(&pod.id)?;
        if statuses.values().any(|s| *s == ContainerState::Running) {
            return Err(SpecError::PolicyConflict {
                message: format!("cannot add init container to running pod {}", pod.name),
            });
        }
    }
    Ok(annotations)
}
