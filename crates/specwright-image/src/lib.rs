//! # specwright-image
//!
//! Image metadata resolution for the specwright engine.
//!
//! Handles:
//! - **Store**: the [`ImageStore`](store::ImageStore) contract and image metadata types.
//! - **Manifest**: platform matching for multi-platform manifest lists.
//! - **Resolver**: attaching a concrete image and its inspect data to a draft.
//! - **Catalog**: a JSON-file-backed local image store.
//! - **Digest**: SHA-256 image IDs for catalog entries.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod catalog;
pub mod digest;
pub mod manifest;
pub mod resolver;
pub mod store;
