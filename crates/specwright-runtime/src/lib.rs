//! Collaborator contracts and the runtime facade for the specwright engine.
//!
//! The resolution pipeline never talks to storage directly. It reaches
//! images, containers, pods, networks, the labeling policy and the process
//! environment through the traits defined here, bundled in a [`Runtime`].

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod host;
pub mod label;
pub mod runtime;
pub mod state;
pub mod store;

pub use runtime::Runtime;
