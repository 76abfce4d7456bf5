//! SHA-256 image IDs.
//!
//! Catalog entries registered without an ID get one derived from their
//! configuration, so registering the same image twice yields the same ID.

use serde::Serialize;
use sha2::{Digest, Sha256};
use specwright_common::error::Result;
use specwright_common::types::ImageId;

use crate::store::{ImageData, ManifestInstance};

#[derive(Serialize)]
struct IdInput<'a> {
    config: Option<&'a ImageData>,
    manifests: &'a [ManifestInstance],
}

/// Returns the lowercase hex SHA-256 of `data`.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Derives an image ID from an image's configuration and manifest list.
///
/// # Errors
///
/// Returns [`SpecError::Serialization`](specwright_common::error::SpecError::Serialization)
/// if the configuration cannot be serialized.
pub fn image_id(config: Option<&ImageData>, manifests: &[ManifestInstance]) -> Result<ImageId> {
    let canonical = serde_json::to_vec(&IdInput { config, manifests })?;
    Ok(ImageId::new(sha256_hex(&canonical)))
}

/// Returns `true` if `s` is a full lowercase hex SHA-256 digest.
#[must_use]
pub fn is_full_id(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn id_is_stable_and_content_addressed() {
        let config = ImageData {
            user: Some("nobody".into()),
            ..ImageData::default()
        };
        let a = image_id(Some(&config), &[]).expect("id");
        let b = image_id(Some(&config), &[]).expect("id");
        let other = image_id(None, &[]).expect("id");
        assert_eq!(a, b);
        assert_ne!(a, other);
        assert!(is_full_id(a.as_str()));
    }

    #[test]
    fn full_id_detection() {
        assert!(!is_full_id("abc"));
        assert!(!is_full_id(&"G".repeat(64)));
        assert!(is_full_id(&"0a".repeat(32)));
    }
}
