//! Local image catalog.
//!
//! Keeps an index of known images, their configuration, and the instances
//! of manifest lists in a JSON file. The catalog is the [`ImageStore`]
//! the CLI resolves drafts against.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use specwright_common::error::{Result, SpecError};
use specwright_common::types::ImageId;

use crate::digest;
use crate::store::{Image, ImageData, ImageStore, ManifestInstance};

/// Shortest ID prefix accepted as an image reference.
const MIN_ID_PREFIX: usize = 3;

/// Entry in the local image catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Image ID; derived from the content when registered empty.
    #[serde(default)]
    pub id: ImageId,
    /// Names (`registry/repo:tag`) pointing at this image.
    #[serde(default)]
    pub names: Vec<String>,
    /// Configuration of a plain image; `None` for a manifest list.
    #[serde(default)]
    pub config: Option<ImageData>,
    /// Instances of a manifest list.
    #[serde(default)]
    pub manifests: Vec<ManifestInstance>,
    /// Registration time.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ImageEntry {
    fn to_image(&self) -> Image {
        Image {
            id: self.id.clone(),
            names: self.names.clone(),
            manifests: self.manifests.clone(),
        }
    }
}

/// Image catalog backed by a JSON file.
#[derive(Debug)]
pub struct ImageCatalog {
    catalog_path: PathBuf,
}

impl ImageCatalog {
    /// Opens or creates an image catalog in the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog directory cannot be created.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let catalog_path = data_dir.join("images").join("catalog.json");
        if let Some(parent) = catalog_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SpecError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        Ok(Self { catalog_path })
    }

    /// Lists all images in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be read or parsed.
    pub fn list(&self) -> Result<Vec<ImageEntry>> {
        if !self.catalog_path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.catalog_path).map_err(|e| SpecError::Io {
            path: self.catalog_path.clone(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Registers an image, replacing any entry with the same ID.
    ///
    /// Names carried by the new entry are taken away from older entries.
    /// Returns the ID the entry was stored under.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or written.
    pub fn register(&self, mut entry: ImageEntry) -> Result<ImageId> {
        if entry.id.as_str().is_empty() {
            entry.id = digest::image_id(entry.config.as_ref(), &entry.manifests)?;
        }
        let mut entries = self.list()?;
        entries.retain(|e| e.id != entry.id);
        for existing in &mut entries {
            existing.names.retain(|n| !entry.names.contains(n));
        }
        tracing::debug!(id = %entry.id, names = ?entry.names, "registering image");
        let id = entry.id.clone();
        entries.push(entry);
        self.write_entries(&entries)?;
        Ok(id)
    }

    /// Removes an image by ID.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Lookup`] if no image with the given ID exists.
    pub fn remove(&self, id: &ImageId) -> Result<()> {
        let mut entries = self.list()?;
        let before = entries.len();
        entries.retain(|e| &e.id != id);
        if entries.len() == before {
            return Err(SpecError::lookup("image", id.as_str()));
        }
        self.write_entries(&entries)
    }

    fn write_entries(&self, entries: &[ImageEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.catalog_path, json).map_err(|e| SpecError::Io {
            path: self.catalog_path.clone(),
            source: e,
        })
    }
}

/// Returns `true` if the last path component of `reference` carries a tag or digest.
fn has_tag(reference: &str) -> bool {
    let last = reference.rsplit('/').next().unwrap_or(reference);
    last.contains(':') || last.contains('@')
}

/// Returns the first name of `entry` matching `reference`.
///
/// A reference matches a name exactly, or as its trailing path components
/// (`alpine` matches `docker.io/library/alpine:latest`). References without
/// a tag are matched as `:latest`.
fn matching_name<'a>(entry: &'a ImageEntry, reference: &str) -> Option<&'a str> {
    let tagged = if has_tag(reference) {
        reference.to_string()
    } else {
        format!("{reference}:latest")
    };
    let exact = entry
        .names
        .iter()
        .find(|n| n.as_str() == reference || **n == tagged);
    exact
        .or_else(|| {
            entry
                .names
                .iter()
                .find(|n| n.ends_with(&format!("/{tagged}")))
        })
        .map(String::as_str)
}

impl ImageStore for ImageCatalog {
    fn lookup_image(&self, reference: &str) -> Result<(Image, String)> {
        let entries = self.list()?;

        if let Some((entry, name)) = entries
            .iter()
            .find_map(|e| matching_name(e, reference).map(|n| (e, n)))
        {
            return Ok((entry.to_image(), name.to_string()));
        }

        let id_ref = reference.strip_prefix("sha256:").unwrap_or(reference);
        if id_ref.len() >= MIN_ID_PREFIX {
            let mut candidates = entries.iter().filter(|e| e.id.as_str().starts_with(id_ref));
            if let Some(entry) = candidates.next() {
                if candidates.next().is_some() {
                    return Err(SpecError::validation(format!(
                        "image ID prefix {id_ref:?} is ambiguous"
                    )));
                }
                return Ok((entry.to_image(), entry.id.to_string()));
            }
        }

        Err(SpecError::lookup("image", reference))
    }

    fn image(&self, id: &ImageId) -> Result<Image> {
        self.list()?
            .iter()
            .find(|e| &e.id == id)
            .map(ImageEntry::to_image)
            .ok_or_else(|| SpecError::lookup("image", id.as_str()))
    }

    fn inspect(&self, image: &Image) -> Result<ImageData> {
        let entries = self.list()?;
        let entry = entries
            .iter()
            .find(|e| e.id == image.id)
            .ok_or_else(|| SpecError::lookup("image", image.id.as_str()))?;
        entry.config.clone().ok_or_else(|| {
            SpecError::validation(format!("image {} has no configuration", image.id.short()))
        })
    }
}
