//! Image store contract and image metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use specwright_common::error::{Result, SpecError};
use specwright_common::types::ImageId;
use specwright_spec::health::HealthConfig;

/// OS, architecture, and variant an image was built for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Platform {
    /// OCI architecture name (`amd64`, `arm64`, ...).
    pub architecture: String,
    /// Operating system.
    pub os: String,
    /// Architecture variant (`v7`, `v8`, ...).
    pub variant: Option<String>,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.os, self.architecture)?;
        if let Some(variant) = &self.variant {
            write!(f, "/{variant}")?;
        }
        Ok(())
    }
}

/// One platform-specific image referenced by a manifest list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestInstance {
    /// Image the instance resolves to.
    pub image_id: ImageId,
    /// Platform of the instance.
    pub platform: Platform,
}

/// A local image or manifest list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Image ID.
    pub id: ImageId,
    /// Names (`registry/repo:tag`) pointing at this image.
    pub names: Vec<String>,
    /// Instances when this is a manifest list; empty for a plain image.
    pub manifests: Vec<ManifestInstance>,
}

impl Image {
    /// Returns the instances of a manifest list, or `None` for a plain image.
    #[must_use]
    pub fn manifest_list(&self) -> Option<&[ManifestInstance]> {
        if self.manifests.is_empty() {
            None
        } else {
            Some(&self.manifests)
        }
    }
}

/// Inspect data of an image: the configuration it declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageData {
    /// Declared environment as `KEY=VALUE` entries.
    pub env: Vec<String>,
    /// Declared labels.
    pub labels: BTreeMap<String, String>,
    /// Declared user.
    pub user: Option<String>,
    /// Declared stop signal, by name or number.
    pub stop_signal: Option<String>,
    /// Declared health check.
    pub health_check: Option<HealthConfig>,
    /// Platform the image was built for.
    pub platform: Platform,
    /// Build time.
    pub created: Option<DateTime<Utc>>,
}

impl ImageData {
    /// Returns the declared environment as a map.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Validation`] if an entry is not `KEY=VALUE`.
    pub fn env_map(&self) -> Result<BTreeMap<String, String>> {
        let mut env = BTreeMap::new();
        for entry in &self.env {
            let Some((key, value)) = entry.split_once('=').filter(|(k, _)| !k.is_empty()) else {
                return Err(SpecError::validation(format!(
                    "image environment entry {entry:?} is not KEY=VALUE"
                )));
            };
            let _ = env.insert(key.to_string(), value.to_string());
        }
        Ok(env)
    }
}

/// Access to locally stored images.
///
/// Implementations may perform I/O; callers never retry failed calls.
pub trait ImageStore: Send + Sync {
    /// Looks up an image by name, ID, or ID prefix, returning it with the
    /// name the reference resolved to. Manifest lists are returned as such.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Lookup`] if the reference does not resolve.
    fn lookup_image(&self, reference: &str) -> Result<(Image, String)>;

    /// Returns the image with the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Lookup`] if no such image exists.
    fn image(&self, id: &ImageId) -> Result<Image>;

    /// Returns the inspect data of a plain image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image has no configuration (for example a
    /// manifest list) or the store cannot be read.
    fn inspect(&self, image: &Image) -> Result<ImageData>;
}
