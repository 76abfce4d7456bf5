//! Instance selection for multi-platform manifest lists.

use specwright_common::error::{Result, SpecError};
use specwright_common::types::ImageId;

use crate::store::{ManifestInstance, Platform};

/// Maps a Rust target architecture to its OCI name.
fn oci_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64le",
        "loongarch64" => "loong64",
        other => other,
    }
}

/// Returns the platform requested by a draft, defaulting to the host.
///
/// Architecture and OS fall back to the platform this binary runs on; the
/// variant only constrains the match when given.
#[must_use]
pub fn requested_platform(
    arch: Option<&str>,
    os: Option<&str>,
    variant: Option<&str>,
) -> Platform {
    let non_empty = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);
    Platform {
        architecture: non_empty(arch)
            .unwrap_or_else(|| oci_arch(std::env::consts::ARCH).to_string()),
        os: non_empty(os).unwrap_or_else(|| std::env::consts::OS.to_string()),
        variant: non_empty(variant),
    }
}

/// Picks the instance of a manifest list matching the requested platform.
///
/// # Errors
///
/// Returns [`SpecError::Lookup`] if no instance matches.
pub fn lookup_instance(
    list_name: &str,
    instances: &[ManifestInstance],
    requested: &Platform,
) -> Result<ImageId> {
    instances
        .iter()
        .find(|m| {
            m.platform.architecture == requested.architecture
                && m.platform.os == requested.os
                && requested
                    .variant
                    .as_ref()
                    .is_none_or(|v| m.platform.variant.as_ref() == Some(v))
        })
        .map(|m| {
            tracing::debug!(list = list_name, instance = %m.image_id, platform = %m.platform, "manifest instance selected");
            m.image_id.clone()
        })
        .ok_or_else(|| {
            SpecError::lookup("manifest instance", format!("{requested} in {list_name}"))
        })
}
