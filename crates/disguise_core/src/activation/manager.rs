//! Activation manager.
//!
//! # Responsibility
//! - Serialize activation sweeps within the process.
//! - Translate registry failures into `ActivationError` without retrying.
//!
//! # Invariants
//! - Every registry command of one sweep runs while `sweep_lock` is held.
//! - The identity reported on success is the identity that was resolved.
//! - No state is kept between calls except what the registry stores.

use crate::activation::outcome::{
    ActivationError, ActivationOutcome, ActivationResult, HealOutcome, IdentitySnapshot,
    SweepOrder,
};
use crate::activation::resolve::{resolve, Resolution};
use crate::identity::catalog::LauncherIdentity;
use crate::identity::set::{IdentityEntry, IdentitySet};
use crate::logging::sanitize_message;
use crate::registry::{ComponentRegistry, ComponentState};
use log::{debug, error, info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use uuid::Uuid;

const MAX_LOGGED_REQUEST_CHARS: usize = 64;

/// Makes exactly one identity of an `IdentitySet` launchable.
pub struct ActivationManager<R: ComponentRegistry> {
    identities: IdentitySet,
    registry: R,
    sweep_order: SweepOrder,
    sweep_lock: Mutex<()>,
}

impl<R: ComponentRegistry> ActivationManager<R> {
    /// Creates a manager using the default disable-all-then-enable sweep.
    pub fn new(identities: IdentitySet, registry: R) -> Self {
        Self {
            identities,
            registry,
            sweep_order: SweepOrder::default(),
            sweep_lock: Mutex::new(()),
        }
    }

    pub fn with_sweep_order(mut self, sweep_order: SweepOrder) -> Self {
        self.sweep_order = sweep_order;
        self
    }

    pub fn identities(&self) -> &IdentitySet {
        &self.identities
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn sweep_order(&self) -> SweepOrder {
        self.sweep_order
    }

    /// Resolves `requested` without touching the registry.
    pub fn resolve(&self, requested: Option<&str>) -> Resolution<'_> {
        resolve(&self.identities, requested)
    }

    /// Makes the identity named by `requested` the only enabled one.
    ///
    /// Absent, empty and unknown names activate `default`; unknown names
    /// additionally carry an `UnknownIdentityRequested` note.
    ///
    /// # Errors
    /// - `RegistryCommandFailed` when the registry rejects any command. The
    ///   sweep stops at that command; earlier commands stay applied.
    pub fn activate(&self, requested: Option<&str>) -> ActivationResult {
        let _guard = self.lock_sweep();
        let resolution = self.resolve(requested);
        self.sweep(resolution, requested)
    }

    /// Reads every identity's state back from the registry.
    ///
    /// # Errors
    /// - `RegistryQueryFailed` for the first identity the registry cannot
    ///   report.
    pub fn snapshot(&self) -> Result<IdentitySnapshot, ActivationError> {
        let _guard = self.lock_sweep();
        self.read_snapshot()
    }

    /// Startup pass repairing a registry left inconsistent by a crash.
    ///
    /// Leaves the registry untouched when exactly one identity is enabled,
    /// otherwise re-activates `default`.
    pub fn self_heal(&self) -> Result<HealOutcome, ActivationError> {
        let _guard = self.lock_sweep();
        let snapshot = self.read_snapshot()?;
        if let Some(identity) = snapshot.active() {
            info!(
                "event=self_heal module=activation status=ok action=none active={}",
                identity
            );
            return Ok(HealOutcome::Consistent(identity));
        }

        let previously_enabled = snapshot.enabled();
        warn!(
            "event=self_heal module=activation status=repairing enabled_count={} enabled={}",
            previously_enabled.len(),
            join_ids(&previously_enabled)
        );
        let resolution = self.resolve(None);
        let outcome = self.sweep(resolution, None)?;
        Ok(HealOutcome::Repaired {
            previously_enabled,
            outcome,
        })
    }

    fn sweep(&self, resolution: Resolution<'_>, requested: Option<&str>) -> ActivationResult {
        let started_at = Instant::now();
        let activation_id = Uuid::new_v4();
        let target = resolution.entry;

        info!(
            "event=activation module=activation status=start activation_id={} requested={} target={} order={}",
            activation_id,
            requested.map_or_else(
                || "<none>".to_string(),
                |value| sanitize_message(value, MAX_LOGGED_REQUEST_CHARS)
            ),
            target.identity,
            self.sweep_order.as_str()
        );
        if let Some(note) = &resolution.fallback {
            warn!(
                "event=activation module=activation status=fallback activation_id={} {}",
                activation_id, note
            );
        }

        let result = match self.sweep_order {
            SweepOrder::DisableAllThenEnable => self
                .identities
                .entries()
                .iter()
                .try_for_each(|entry| self.apply(activation_id, entry, ComponentState::Disabled))
                .and_then(|()| self.apply(activation_id, target, ComponentState::Enabled)),
            SweepOrder::EnableThenDisableOthers => {
                self.apply(activation_id, target, ComponentState::Enabled)
                    .and_then(|()| {
                        self.identities
                            .entries()
                            .iter()
                            .filter(|entry| entry.identity != target.identity)
                            .try_for_each(|entry| {
                                self.apply(activation_id, entry, ComponentState::Disabled)
                            })
                    })
            }
        };

        match result {
            Ok(()) => {
                info!(
                    "event=activation module=activation status=ok activation_id={} active={} duration_ms={}",
                    activation_id,
                    target.identity,
                    started_at.elapsed().as_millis()
                );
                Ok(ActivationOutcome {
                    activation_id,
                    identity: target.identity,
                    component: target.component.clone(),
                    sweep_order: self.sweep_order,
                    fallback: resolution.fallback,
                })
            }
            Err(err) => {
                error!(
                    "event=activation module=activation status=error activation_id={} target={} error_code={} failed_identity={} error={} duration_ms={}",
                    activation_id,
                    target.identity,
                    err.cause().code(),
                    err.identity(),
                    err,
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    fn apply(
        &self,
        activation_id: Uuid,
        entry: &IdentityEntry,
        state: ComponentState,
    ) -> Result<(), ActivationError> {
        debug!(
            "event=registry_command module=activation activation_id={} command={} identity={} component={}",
            activation_id,
            state.command(),
            entry.identity,
            entry.component
        );
        self.registry
            .set_component_state(&entry.component, state)
            .map_err(|cause| ActivationError::RegistryCommandFailed {
                identity: entry.identity,
                command: state,
                cause,
            })
    }

    fn read_snapshot(&self) -> Result<IdentitySnapshot, ActivationError> {
        let states = self
            .identities
            .entries()
            .iter()
            .map(|entry| {
                self.registry
                    .component_state(&entry.component)
                    .map(|state| (entry.identity, state))
                    .map_err(|cause| ActivationError::RegistryQueryFailed {
                        identity: entry.identity,
                        cause,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(IdentitySnapshot { states })
    }

    fn lock_sweep(&self) -> MutexGuard<'_, ()> {
        // The guard protects no data, so a panic in another sweep leaves
        // nothing to repair here.
        self.sweep_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn join_ids(identities: &[LauncherIdentity]) -> String {
    if identities.is_empty() {
        return "<none>".to_string();
    }
    identities
        .iter()
        .map(|identity| identity.id())
        .collect::<Vec<_>>()
        .join(",")
}
