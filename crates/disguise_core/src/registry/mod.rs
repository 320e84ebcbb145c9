//! Component registry contracts and implementations.
//!
//! # Responsibility
//! - Define the seam between activation logic and the platform store that
//!   decides which launcher components are enabled.
//! - Provide in-memory and SQLite-backed registries for hosts without a
//!   platform package manager (tests, CLI, desktop builds).
//!
//! # Invariants
//! - `set_component_state` is idempotent: applying the same state twice is
//!   indistinguishable from applying it once.
//! - Registries never invent components; unknown refs yield `NoSuchComponent`.

use crate::identity::catalog::ComponentRef;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryComponentRegistry;
pub use sqlite::SqliteComponentRegistry;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Enabled state of one launcher component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentState {
    Enabled,
    Disabled,
}

impl ComponentState {
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }

    /// Command verb used in logs and error reports.
    pub fn command(self) -> &'static str {
        match self {
            Self::Enabled => "enable",
            Self::Disabled => "disable",
        }
    }
}

/// Registry-level command failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    NoSuchComponent(ComponentRef),
    PermissionDenied,
    Unavailable(String),
}

impl RegistryError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoSuchComponent(_) => "no_such_component",
            Self::PermissionDenied => "permission_denied",
            Self::Unavailable(_) => "registry_unavailable",
        }
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSuchComponent(component) => write!(f, "no such component: {component}"),
            Self::PermissionDenied => write!(f, "operation not permitted"),
            Self::Unavailable(message) => write!(f, "registry unavailable: {message}"),
        }
    }
}

impl Error for RegistryError {}

impl From<rusqlite::Error> for RegistryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Unavailable(value.to_string())
    }
}

/// Store deciding which launcher components are currently launchable.
///
/// Implementations are shared process-wide, so they must be `Send + Sync`.
/// Calls are synchronous and expected to complete promptly.
pub trait ComponentRegistry: Send + Sync {
    /// Applies `state` to `component`.
    fn set_component_state(
        &self,
        component: &ComponentRef,
        state: ComponentState,
    ) -> RegistryResult<()>;

    /// Reads back the current state of `component`.
    fn component_state(&self, component: &ComponentRef) -> RegistryResult<ComponentState>;

    fn disable(&self, component: &ComponentRef) -> RegistryResult<()> {
        self.set_component_state(component, ComponentState::Disabled)
    }

    fn enable(&self, component: &ComponentRef) -> RegistryResult<()> {
        self.set_component_state(component, ComponentState::Enabled)
    }
}

impl<R: ComponentRegistry + ?Sized> ComponentRegistry for std::sync::Arc<R> {
    fn set_component_state(
        &self,
        component: &ComponentRef,
        state: ComponentState,
    ) -> RegistryResult<()> {
        (**self).set_component_state(component, state)
    }

    fn component_state(&self, component: &ComponentRef) -> RegistryResult<ComponentState> {
        (**self).component_state(component)
    }
}
