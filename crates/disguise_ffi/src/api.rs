//! FFI use-case API for Flutter-facing launcher calls.
//!
//! # Responsibility
//! - Expose launcher-alias use cases to Dart via FRB.
//! - Own the process-wide activation manager and its registry handle.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - All activations in this process go through one `ActivationManager`, so
//!   its sweep lock serializes concurrent Dart isolates.
//! - Identity names crossing the boundary are symbolic ids (`notes`, ...).

use disguise_core::{
    core_version as core_version_inner, handle_launcher_call as handle_launcher_call_inner,
    init_logging as init_logging_inner, ping as ping_inner, ActivationManager,
    ComponentRegistry, HealOutcome, IdentitySet, LauncherCall, LauncherReply,
    SqliteComponentRegistry,
};
use log::{error, info};
use std::path::PathBuf;
use std::sync::OnceLock;

const REGISTRY_DB_FILE_NAME: &str = "launcher_disguise_registry.sqlite3";
const REGISTRY_DB_PATH_ENV: &str = "DISGUISE_REGISTRY_DB_PATH";
const ERROR_CODE_INIT_FAILED: &str = "INIT_FAILED";
static REGISTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static RUNTIME: OnceLock<Result<LauncherRuntime, String>> = OnceLock::new();

struct LauncherRuntime {
    manager: ActivationManager<SqliteComponentRegistry>,
    /// Set when the repair pass run at startup failed.
    startup_heal_error: Option<String>,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Response envelope for launcher alias operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherAliasResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Symbolic id of the identity now launchable.
    pub active_alias: Option<String>,
    /// Whether an unrecognized alias was replaced by `default`.
    pub fallback_applied: bool,
    /// Stable error code on failure.
    pub error_code: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl LauncherAliasResponse {
    fn success(active_alias: &str, fallback_applied: bool, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            active_alias: Some(active_alias.to_string()),
            fallback_applied,
            error_code: None,
            message: message.into(),
        }
    }

    fn failure(error_code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            active_alias: None,
            fallback_applied: false,
            error_code: Some(error_code.to_string()),
            message: message.into(),
        }
    }
}

/// Registry status envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherStatusResponse {
    pub ok: bool,
    /// Active identity id, `None` unless exactly one identity is enabled.
    pub active_alias: Option<String>,
    /// Ids of every enabled identity in catalogue order.
    pub enabled_aliases: Vec<String>,
    /// Why the startup repair pass failed, if it did.
    pub startup_heal_error: Option<String>,
    pub message: String,
}

/// One method-channel reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherChannelResponse {
    /// `false` when the method is unknown (`notImplemented` on the Dart side).
    pub implemented: bool,
    pub ok: bool,
    pub active_alias: Option<String>,
    pub error_code: Option<String>,
    pub message: String,
}

/// Makes `alias` the only launchable identity.
///
/// Input semantics:
/// - `alias`: symbolic id (`calculator`) or alias class
///   (`MainActivityAliasCalculator`); `None`, empty or unknown means `default`.
///
/// # FFI contract
/// - Sync call, registry-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn set_launcher_alias(alias: Option<String>) -> LauncherAliasResponse {
    let manager = match manager() {
        Ok(manager) => manager,
        Err(err) => return LauncherAliasResponse::failure(ERROR_CODE_INIT_FAILED, err),
    };

    match manager.activate(alias.as_deref()) {
        Ok(outcome) => {
            let message = match &outcome.fallback {
                Some(note) => note.to_string(),
                None => format!("Launcher alias set to {}.", outcome.identity),
            };
            LauncherAliasResponse::success(outcome.identity.id(), outcome.used_fallback(), message)
        }
        Err(err) => LauncherAliasResponse::failure(
            err.code(),
            format!("Error setting launcher alias: {err}"),
        ),
    }
}

/// Reads back which identities are enabled.
#[flutter_rust_bridge::frb(sync)]
pub fn launcher_status() -> LauncherStatusResponse {
    let startup_heal_error = runtime()
        .ok()
        .and_then(|runtime| runtime.startup_heal_error.clone());
    let snapshot = match manager()
        .and_then(|manager| manager.snapshot().map_err(|err| err.to_string()))
    {
        Ok(snapshot) => snapshot,
        Err(err) => {
            return LauncherStatusResponse {
                ok: false,
                active_alias: None,
                enabled_aliases: Vec::new(),
                startup_heal_error,
                message: format!("launcher_status failed: {err}"),
            }
        }
    };

    let enabled_aliases = snapshot
        .enabled()
        .into_iter()
        .map(|identity| identity.id().to_string())
        .collect::<Vec<_>>();
    let active_alias = snapshot.active().map(|identity| identity.id().to_string());
    let message = match &active_alias {
        Some(active) => format!("Active launcher alias: {active}."),
        None => format!(
            "Inconsistent launcher state: {} alias(es) enabled.",
            enabled_aliases.len()
        ),
    };
    LauncherStatusResponse {
        ok: true,
        active_alias,
        enabled_aliases,
        startup_heal_error,
        message,
    }
}

/// Repairs a registry left with zero or several enabled identities.
#[flutter_rust_bridge::frb(sync)]
pub fn heal_launcher_alias() -> LauncherAliasResponse {
    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err(err) => return LauncherAliasResponse::failure(ERROR_CODE_INIT_FAILED, err),
    };
    let with_startup_note = |message: &str| match &runtime.startup_heal_error {
        Some(startup) => format!("{message} Startup repair had failed: {startup}"),
        None => message.to_string(),
    };

    match runtime.manager.self_heal() {
        Ok(HealOutcome::Consistent(identity)) => LauncherAliasResponse::success(
            identity.id(),
            false,
            with_startup_note("Launcher state consistent."),
        ),
        Ok(HealOutcome::Repaired { outcome, .. }) => LauncherAliasResponse::success(
            outcome.identity.id(),
            false,
            with_startup_note("Launcher state repaired."),
        ),
        Err(err) => LauncherAliasResponse::failure(
            err.code(),
            format!("Error repairing launcher alias: {err}"),
        ),
    }
}

/// Dispatches one launcher method-channel call.
///
/// # FFI contract
/// - Unknown `method` returns `implemented = false` without side effects.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn handle_launcher_call(method: String, alias: Option<String>) -> LauncherChannelResponse {
    let manager = match manager() {
        Ok(manager) => manager,
        Err(err) => {
            return LauncherChannelResponse {
                implemented: true,
                ok: false,
                active_alias: None,
                error_code: Some(ERROR_CODE_INIT_FAILED.to_string()),
                message: err,
            }
        }
    };

    match handle_launcher_call_inner(manager, &LauncherCall { method, alias }) {
        LauncherReply::Success { active, fallback } => LauncherChannelResponse {
            implemented: true,
            ok: true,
            active_alias: Some(active.id().to_string()),
            error_code: None,
            message: fallback.map(|note| note.to_string()).unwrap_or_default(),
        },
        LauncherReply::Error { code, message } => LauncherChannelResponse {
            implemented: true,
            ok: false,
            active_alias: None,
            error_code: Some(code.to_string()),
            message,
        },
        LauncherReply::NotImplemented => LauncherChannelResponse {
            implemented: false,
            ok: false,
            active_alias: None,
            error_code: None,
            message: String::new(),
        },
    }
}

fn runtime() -> Result<&'static LauncherRuntime, String> {
    RUNTIME
        .get_or_init(build_runtime)
        .as_ref()
        .map_err(Clone::clone)
}

fn manager() -> Result<&'static ActivationManager<SqliteComponentRegistry>, String> {
    runtime().map(|runtime| &runtime.manager)
}

fn build_runtime() -> Result<LauncherRuntime, String> {
    let db_path = resolve_registry_db_path();
    let identities =
        IdentitySet::builtin().map_err(|err| format!("identity set invalid: {err}"))?;
    let registry = SqliteComponentRegistry::open(&db_path)
        .map_err(|err| format!("registry open failed: {err}"))?;
    registry
        .install(&identities)
        .map_err(|err| format!("registry install failed: {err}"))?;

    let manager = ActivationManager::new(identities, registry);
    // A crash during an earlier sweep may have left nothing enabled.
    let startup_heal_error = startup_heal(&manager);
    Ok(LauncherRuntime {
        manager,
        startup_heal_error,
    })
}

/// Runs the startup repair pass; returns the failure text, if any.
fn startup_heal<R: ComponentRegistry>(manager: &ActivationManager<R>) -> Option<String> {
    match manager.self_heal() {
        Ok(outcome) => {
            info!(
                "event=ffi_init module=ffi status=ok active={}",
                outcome.active()
            );
            None
        }
        Err(err) => {
            error!(
                "event=ffi_init module=ffi status=error error_code={} error={}",
                err.code(),
                err
            );
            Some(format!("{}: {err}", err.code()))
        }
    }
}

fn resolve_registry_db_path() -> PathBuf {
    REGISTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(REGISTRY_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(REGISTRY_DB_FILE_NAME)
        })
        .clone()
}
