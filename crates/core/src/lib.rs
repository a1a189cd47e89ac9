//! Plateful Core - Shared types library.
//!
//! This crate provides the common types used across all Plateful components:
//! - `app` - The headless application core (cart, session gate, services)
//! - `integration-tests` - End-to-end scenarios over in-memory collaborators
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no async, no collaborator
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails,
//!   statuses, and session tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
