//! Activation results, errors and registry snapshots.

use crate::identity::catalog::{ComponentRef, LauncherIdentity};
use crate::registry::{ComponentState, RegistryError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ActivationResult = Result<ActivationOutcome, ActivationError>;

/// Order in which one sweep issues registry commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepOrder {
    /// Disable every identity, then enable the target.
    ///
    /// A crash mid-sweep can leave nothing enabled.
    #[default]
    DisableAllThenEnable,
    /// Enable the target, then disable every other identity.
    ///
    /// A crash mid-sweep can leave two identities enabled.
    EnableThenDisableOthers,
}

impl SweepOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DisableAllThenEnable => "disable_all_then_enable",
            Self::EnableThenDisableOthers => "enable_then_disable_others",
        }
    }
}

/// Informational note: the requested name matched no identity, so the
/// default identity was activated instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownIdentityRequested {
    pub requested: String,
}

impl Display for UnknownIdentityRequested {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown identity `{}` requested; activated default",
            self.requested
        )
    }
}

/// Successful activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationOutcome {
    /// Correlates log lines of one sweep.
    pub activation_id: Uuid,
    /// Identity enabled at the end of the sweep.
    pub identity: LauncherIdentity,
    pub component: ComponentRef,
    pub sweep_order: SweepOrder,
    pub fallback: Option<UnknownIdentityRequested>,
}

impl ActivationOutcome {
    pub fn used_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Activation failures surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    /// The registry rejected a disable/enable command; the sweep halted there.
    RegistryCommandFailed {
        identity: LauncherIdentity,
        command: ComponentState,
        cause: RegistryError,
    },
    /// The registry could not report one identity's state.
    RegistryQueryFailed {
        identity: LauncherIdentity,
        cause: RegistryError,
    },
}

impl ActivationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::RegistryCommandFailed { .. } => "registry_command_failed",
            Self::RegistryQueryFailed { .. } => "registry_query_failed",
        }
    }

    /// Identity whose command or query failed.
    pub fn identity(&self) -> LauncherIdentity {
        match self {
            Self::RegistryCommandFailed { identity, .. }
            | Self::RegistryQueryFailed { identity, .. } => *identity,
        }
    }

    pub fn cause(&self) -> &RegistryError {
        match self {
            Self::RegistryCommandFailed { cause, .. } | Self::RegistryQueryFailed { cause, .. } => {
                cause
            }
        }
    }
}

impl Display for ActivationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RegistryCommandFailed {
                identity,
                command,
                cause,
            } => write!(f, "failed to {} identity `{identity}`: {cause}", command.command()),
            Self::RegistryQueryFailed { identity, cause } => {
                write!(f, "failed to read state of identity `{identity}`: {cause}")
            }
        }
    }
}

impl Error for ActivationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.cause())
    }
}

/// Registry state of every identity, read back in catalogue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySnapshot {
    pub states: Vec<(LauncherIdentity, ComponentState)>,
}

impl IdentitySnapshot {
    pub fn enabled(&self) -> Vec<LauncherIdentity> {
        self.states
            .iter()
            .filter(|(_, state)| state.is_enabled())
            .map(|(identity, _)| *identity)
            .collect()
    }

    /// The launchable identity, when exactly one is enabled.
    pub fn active(&self) -> Option<LauncherIdentity> {
        match self.enabled().as_slice() {
            [identity] => Some(*identity),
            _ => None,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.active().is_some()
    }
}

/// Result of the startup self-heal pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealOutcome {
    /// Exactly one identity was enabled; nothing was changed.
    Consistent(LauncherIdentity),
    /// Zero or several identities were enabled; default was re-activated.
    Repaired {
        previously_enabled: Vec<LauncherIdentity>,
        outcome: ActivationOutcome,
    },
}

impl HealOutcome {
    pub fn active(&self) -> LauncherIdentity {
        match self {
            Self::Consistent(identity) => *identity,
            Self::Repaired { outcome, .. } => outcome.identity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ActivationError, IdentitySnapshot};
    use crate::identity::catalog::LauncherIdentity;
    use crate::registry::{ComponentState, RegistryError};
    use std::error::Error;

    #[test]
    fn snapshot_reports_active_only_when_exactly_one_enabled() {
        let one = IdentitySnapshot {
            states: vec![
                (LauncherIdentity::Default, ComponentState::Disabled),
                (LauncherIdentity::Notes, ComponentState::Enabled),
            ],
        };
        assert_eq!(one.active(), Some(LauncherIdentity::Notes));

        let none = IdentitySnapshot {
            states: vec![(LauncherIdentity::Default, ComponentState::Disabled)],
        };
        assert_eq!(none.active(), None);
        assert!(!none.is_consistent());

        let two = IdentitySnapshot {
            states: vec![
                (LauncherIdentity::Default, ComponentState::Enabled),
                (LauncherIdentity::Clock, ComponentState::Enabled),
            ],
        };
        assert_eq!(two.active(), None);
        assert_eq!(
            two.enabled(),
            vec![LauncherIdentity::Default, LauncherIdentity::Clock]
        );
    }

    #[test]
    fn command_failure_message_names_command_identity_and_cause() {
        let err = ActivationError::RegistryCommandFailed {
            identity: LauncherIdentity::Weather,
            command: ComponentState::Enabled,
            cause: RegistryError::PermissionDenied,
        };
        assert_eq!(
            err.to_string(),
            "failed to enable identity `weather`: operation not permitted"
        );
        assert_eq!(err.identity(), LauncherIdentity::Weather);
        assert_eq!(err.code(), "registry_command_failed");
        assert!(err.source().is_some());
    }
}
