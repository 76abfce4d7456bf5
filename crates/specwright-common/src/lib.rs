//! # specwright-common
//!
//! Shared error definitions, identifiers, daemon configuration, and
//! constants used across the entire specwright workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the primitives the resolution engine and its
//! collaborators build upon.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
