//! # specwright-generate
//!
//! Turns a partial container description into a complete one, and a
//! created container back into a description that can be cloned.
//!
//! The forward path is [`complete_spec`]: image data, daemon defaults and
//! pod context are merged into a [`DraftSpec`](specwright_spec::DraftSpec)
//! under fixed precedence rules. The reverse path is [`config_to_spec`],
//! which rebuilds a draft from a stored container configuration, and
//! [`check_name`], which picks a collision-free name for the copy.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod cascade;
pub mod clone;
pub mod env;
pub mod expand;
pub mod health;
pub mod names;
pub mod namespaces;
pub mod resources;
pub mod security;

pub use cascade::complete_spec;
pub use clone::{ClonedSpec, config_to_spec};
pub use names::{NameKind, check_name};
