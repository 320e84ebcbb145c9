//! In-process component registry.

use crate::identity::catalog::{ComponentRef, LauncherIdentity};
use crate::identity::set::IdentitySet;
use crate::registry::{ComponentRegistry, ComponentState, RegistryError, RegistryResult};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One applied registry command, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCommand {
    pub component: ComponentRef,
    pub state: ComponentState,
}

#[derive(Debug, Default)]
struct MemoryState {
    components: BTreeMap<ComponentRef, ComponentState>,
    failures: BTreeMap<(ComponentRef, bool), RegistryError>,
    journal: Vec<RegistryCommand>,
}

/// Registry kept entirely in memory.
///
/// Supports scripted failures per `(component, state)` and keeps a journal of
/// every applied command so callers can inspect sweep ordering.
#[derive(Debug, Default)]
pub struct MemoryComponentRegistry {
    state: Mutex<MemoryState>,
}

impl MemoryComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry as it looks right after install: only `default` enabled.
    pub fn installed(set: &IdentitySet) -> Self {
        Self::with_enabled(set, &[LauncherIdentity::Default])
    }

    /// Registry knowing every component in `set`, with `enabled` turned on.
    pub fn with_enabled(set: &IdentitySet, enabled: &[LauncherIdentity]) -> Self {
        let registry = Self::new();
        {
            let mut state = registry.lock();
            for entry in set.entries() {
                let component_state = if enabled.contains(&entry.identity) {
                    ComponentState::Enabled
                } else {
                    ComponentState::Disabled
                };
                state
                    .components
                    .insert(entry.component.clone(), component_state);
            }
        }
        registry
    }

    /// Makes every future `state` command on `component` fail with `error`.
    pub fn inject_failure(
        &self,
        component: &ComponentRef,
        state: ComponentState,
        error: RegistryError,
    ) {
        self.lock()
            .failures
            .insert((component.clone(), state.is_enabled()), error);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Applied commands, oldest first.
    pub fn journal(&self) -> Vec<RegistryCommand> {
        self.lock().journal.clone()
    }

    /// Forgets applied commands; component states are kept.
    pub fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    pub fn state_of(&self, component: &ComponentRef) -> Option<ComponentState> {
        self.lock().components.get(component).copied()
    }

    /// Components currently enabled, sorted.
    pub fn enabled_components(&self) -> Vec<ComponentRef> {
        self.lock()
            .components
            .iter()
            .filter(|(_, state)| state.is_enabled())
            .map(|(component, _)| component.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ComponentRegistry for MemoryComponentRegistry {
    fn set_component_state(
        &self,
        component: &ComponentRef,
        state: ComponentState,
    ) -> RegistryResult<()> {
        let mut inner = self.lock();
        if let Some(error) = inner.failures.get(&(component.clone(), state.is_enabled())) {
            return Err(error.clone());
        }
        let Some(slot) = inner.components.get_mut(component) else {
            return Err(RegistryError::NoSuchComponent(component.clone()));
        };
        *slot = state;
        inner.journal.push(RegistryCommand {
            component: component.clone(),
            state,
        });
        Ok(())
    }

    fn component_state(&self, component: &ComponentRef) -> RegistryResult<ComponentState> {
        self.lock()
            .components
            .get(component)
            .copied()
            .ok_or_else(|| RegistryError::NoSuchComponent(component.clone()))
    }
}
