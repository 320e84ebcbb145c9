//! Launcher identity catalogue.
//!
//! # Responsibility
//! - Define the closed set of presentation identities the app can wear.
//! - Build and validate the immutable `IdentitySet` used by activation.
//!
//! # Invariants
//! - Exactly one identity is the `default` (true) identity.
//! - Identity ids and component refs are unique within one set.
//! - An `IdentitySet` is never mutated after construction.

pub mod catalog;
pub mod set;
