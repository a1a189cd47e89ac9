//! Plateful application core.
//!
//! This crate is the headless core of the Plateful menu-management
//! storefront. It owns the client-side state (shopping cart, session gate)
//! and the service layer that talks to external collaborators: the hosted
//! authentication backend, the document store, local key-value persistence,
//! and the push-notification source. Screen rendering sits above this crate
//! and binds to the state it exposes; the collaborators sit below it behind
//! the traits in [`providers`].
//!
//! # Architecture
//!
//! - [`cart`] - In-memory cart store with quantity/price semantics
//! - [`session`] - Session gate deciding which screen group is reachable
//! - [`providers`] - Collaborator traits plus in-memory implementations
//! - [`services`] - Auth, menu, and notification services over the traits
//! - [`state`] - `AppState` dependency container shared across the UI
//! - [`config`] - Environment configuration
//! - [`error`] - Error taxonomy with user-facing message mapping

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod providers;
pub mod services;
pub mod session;
pub mod state;
