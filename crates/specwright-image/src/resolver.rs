//! Attaches a concrete image and its inspect data to a draft.

use specwright_common::error::Result;
use specwright_spec::DraftSpec;

use crate::manifest;
use crate::store::{Image, ImageData, ImageStore};

/// A draft's image after resolution.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    /// The concrete image (never a manifest list).
    pub image: Image,
    /// Name the draft's reference resolved to.
    pub resolved_name: String,
    /// Inspect data of the image.
    pub data: ImageData,
}

/// Resolves the image a draft names and attaches it to the draft.
///
/// Returns `Ok(None)` when the draft runs from a bare rootfs or names no
/// image. An image attached by an earlier call is reused instead of being
/// looked up again. A manifest list is narrowed to the instance matching
/// the draft's requested platform.
///
/// # Errors
///
/// Returns [`SpecError::Lookup`](specwright_common::error::SpecError::Lookup)
/// if the reference does not resolve or no manifest instance matches, and
/// propagates store errors from inspection.
pub fn image_from_spec(store: &dyn ImageStore, draft: &mut DraftSpec) -> Result<Option<ResolvedImage>> {
    if !draft.uses_image() {
        return Ok(None);
    }

    if let Some(attached) = draft.attached_image() {
        let image = store.image(&attached.id)?;
        let data = store.inspect(&image)?;
        return Ok(Some(ResolvedImage {
            image,
            resolved_name: attached.resolved_name.clone(),
            data,
        }));
    }

    let reference = draft.image.clone().unwrap_or_default();
    let (mut image, resolved_name) = store.lookup_image(&reference)?;
    if let Some(instances) = image.manifest_list() {
        let platform = manifest::requested_platform(
            draft.image_arch.as_deref(),
            draft.image_os.as_deref(),
            draft.image_variant.as_deref(),
        );
        let instance = manifest::lookup_instance(&resolved_name, instances, &platform)?;
        image = store.image(&instance)?;
    }

    draft.set_image(image.id.clone(), resolved_name.clone());
    let data = store.inspect(&image)?;
    tracing::info!(reference = %reference, resolved = %resolved_name, id = %image.id, "image resolved");
    Ok(Some(ResolvedImage {
        image,
        resolved_name,
        data,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use specwright_common::error::SpecError;
    use specwright_common::types::ImageId;

    use super::*;
    use crate::store::{ManifestInstance, Platform};

    #[derive(Default)]
    struct FakeStore {
        lookups: AtomicUsize,
    }

    impl FakeStore {
        fn plain(id: &str) -> Image {
            Image {
                id: ImageId::new(id),
                names: vec![format!("{id}:latest")],
                manifests: Vec::new(),
            }
        }
    }

    impl ImageStore for FakeStore {
        fn lookup_image(&self, reference: &str) -> Result<(Image, String)> {
            let _ = self.lookups.fetch_add(1, Ordering::SeqCst);
            match reference {
                "alpine" => Ok((Self::plain("alpine"), "docker.io/library/alpine:latest".into())),
                "multi" => Ok((
                    Image {
                        id: ImageId::new("multi"),
                        names: vec!["multi:latest".into()],
                        manifests: vec![ManifestInstance {
                            image_id: ImageId::new("multi-s390x"),
                            platform: Platform {
                                architecture: "s390x".into(),
                                os: "linux".into(),
                                variant: None,
                            },
                        }],
                    },
                    "multi:latest".into(),
                )),
                other => Err(SpecError::lookup("image", other)),
            }
        }

        fn image(&self, id: &ImageId) -> Result<Image> {
            Ok(Self::plain(id.as_str()))
        }

        fn inspect(&self, image: &Image) -> Result<ImageData> {
            Ok(ImageData {
                user: Some(format!("{}-user", image.id)),
                ..ImageData::default()
            })
        }
    }

    #[test]
    fn rootfs_draft_resolves_to_nothing() {
        let store = FakeStore::default();
        let mut draft = DraftSpec::from_rootfs("/srv/rootfs");
        draft.image = Some("alpine".into());
        assert!(image_from_spec(&store, &mut draft).expect("ok").is_none());
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn attaches_and_reuses_the_image() {
        let store = FakeStore::default();
        let mut draft = DraftSpec::from_image("alpine");
        let first = image_from_spec(&store, &mut draft).expect("ok").expect("image");
        assert_eq!(first.resolved_name, "docker.io/library/alpine:latest");
        assert_eq!(draft.attached_image().map(|a| a.id.as_str()), Some("alpine"));

        let second = image_from_spec(&store, &mut draft).expect("ok").expect("image");
        assert_eq!(second.image, first.image);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn selects_manifest_instance_for_requested_platform() {
        let store = FakeStore::default();
        let mut draft = DraftSpec::from_image("multi");
        draft.image_arch = Some("s390x".into());
        draft.image_os = Some("linux".into());
        let resolved = image_from_spec(&store, &mut draft).expect("ok").expect("image");
        assert_eq!(resolved.image.id.as_str(), "multi-s390x");
        assert_eq!(resolved.data.user.as_deref(), Some("multi-s390x-user"));
    }

    #[test]
    fn manifest_mismatch_fails_lookup() {
        let store = FakeStore::default();
        let mut draft = DraftSpec::from_image("multi");
        draft.image_arch = Some("riscv64".into());
        draft.image_os = Some("linux".into());
        let err = image_from_spec(&store, &mut draft).expect_err("mismatch");
        assert!(err.is_lookup());
        assert!(draft.attached_image().is_none());
    }

    #[test]
    fn unknown_reference_fails_lookup() {
        let store = FakeStore::default();
        let mut draft = DraftSpec::from_image("nope");
        assert!(image_from_spec(&store, &mut draft).expect_err("missing").is_lookup());
    }
}
