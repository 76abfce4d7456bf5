//! # specwright-spec
//!
//! Data model of the resolution engine.
//!
//! - **Draft**: [`DraftSpec`](draft::DraftSpec), the partially-populated
//!   container description a caller submits for resolution.
//! - **Namespaces**: the tagged [`Namespace`](namespace::Namespace) declaration
//!   for each of the six isolation domains.
//! - **Network**: the stored [`NetworkMode`](network::NetworkMode) descriptor,
//!   port mappings, and per-network options.
//! - **Health**: health-check parameters and their serialized form.
//! - **Resolved**: [`ResolvedContainerConfig`](resolved::ResolvedContainerConfig),
//!   the immutable system-of-record configuration of a created container.
//! - **Infra**: the pod-inheritable subset of a draft.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod draft;
pub mod health;
pub mod idmap;
pub mod infra;
pub mod namespace;
pub mod network;
pub mod resolved;
pub mod signal;
pub mod volume;

pub use draft::DraftSpec;
pub use namespace::{Namespace, NamespaceKind, NamespaceMode};
pub use resolved::ResolvedContainerConfig;
