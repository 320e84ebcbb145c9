//! Core logic for launcher identity disguises.
//! This crate owns the invariant that exactly one launcher identity is
//! enabled after every successful activation.

pub mod activation;
pub mod channel;
pub mod db;
pub mod identity;
pub mod logging;
pub mod registry;

pub use activation::manager::ActivationManager;
pub use activation::outcome::{
    ActivationError, ActivationOutcome, ActivationResult, HealOutcome, IdentitySnapshot,
    SweepOrder, UnknownIdentityRequested,
};
pub use activation::resolve::{resolve, Resolution};
pub use channel::{handle_launcher_call, LauncherCall, LauncherReply};
pub use identity::catalog::{
    ComponentRef, ComponentRefError, LauncherIdentity, DEFAULT_PACKAGE_NAME,
};
pub use identity::set::{IdentityEntry, IdentitySet, IdentitySetError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use registry::memory::RegistryCommand;
pub use registry::{
    ComponentRegistry, ComponentState, MemoryComponentRegistry, RegistryError, RegistryResult,
    SqliteComponentRegistry,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
