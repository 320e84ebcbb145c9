//! Launcher method-channel dispatch.
//!
//! # Responsibility
//! - Map one UI-layer method call to one activation-manager operation.
//! - Flatten activation errors into the code/message pair the UI expects.
//!
//! # Invariants
//! - One call yields exactly one reply; there are no partial results.
//! - Unknown methods reply `NotImplemented` and never touch the registry.

use crate::activation::manager::ActivationManager;
use crate::activation::outcome::UnknownIdentityRequested;
use crate::identity::catalog::LauncherIdentity;
use crate::registry::ComponentRegistry;

pub const METHOD_SET_LAUNCHER_ALIAS: &str = "setLauncherAlias";
pub const METHOD_GET_LAUNCHER_ALIAS: &str = "getLauncherAlias";
pub const ERROR_CODE_UNAVAILABLE: &str = "UNAVAILABLE";
pub const ERROR_CODE_INCONSISTENT: &str = "INCONSISTENT";

/// Inbound request from the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherCall {
    pub method: String,
    /// `alias` argument; absent means "default".
    pub alias: Option<String>,
}

impl LauncherCall {
    pub fn set_alias(alias: Option<impl Into<String>>) -> Self {
        Self {
            method: METHOD_SET_LAUNCHER_ALIAS.to_string(),
            alias: alias.map(Into::into),
        }
    }

    pub fn get_alias() -> Self {
        Self {
            method: METHOD_GET_LAUNCHER_ALIAS.to_string(),
            alias: None,
        }
    }
}

/// Reply sent back over the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LauncherReply {
    Success {
        active: LauncherIdentity,
        fallback: Option<UnknownIdentityRequested>,
    },
    Error {
        code: &'static str,
        message: String,
    },
    NotImplemented,
}

/// Dispatches one launcher call.
pub fn handle_launcher_call<R: ComponentRegistry>(
    manager: &ActivationManager<R>,
    call: &LauncherCall,
) -> LauncherReply {
    match call.method.as_str() {
        METHOD_SET_LAUNCHER_ALIAS => match manager.activate(call.alias.as_deref()) {
            Ok(outcome) => LauncherReply::Success {
                active: outcome.identity,
                fallback: outcome.fallback,
            },
            Err(err) => LauncherReply::Error {
                code: ERROR_CODE_UNAVAILABLE,
                message: format!("Error setting launcher alias: {err}"),
            },
        },
        METHOD_GET_LAUNCHER_ALIAS => match manager.snapshot() {
            Ok(snapshot) => match snapshot.active() {
                Some(active) => LauncherReply::Success {
                    active,
                    fallback: None,
                },
                None => LauncherReply::Error {
                    code: ERROR_CODE_INCONSISTENT,
                    message: format!(
                        "Expected exactly one enabled launcher alias, found {}",
                        snapshot.enabled().len()
                    ),
                },
            },
            Err(err) => LauncherReply::Error {
                code: ERROR_CODE_UNAVAILABLE,
                message: format!("Error reading launcher alias: {err}"),
            },
        },
        _ => LauncherReply::NotImplemented,
    }
}
