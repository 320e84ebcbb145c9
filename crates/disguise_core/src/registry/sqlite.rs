//! SQLite-backed component registry.
//!
//! # Responsibility
//! - Persist component enabled state across process restarts on hosts
//!   without a platform package manager.
//!
//! # Invariants
//! - A component exists only after `install` (or an explicit `register`).
//! - `install` never overwrites state that is already recorded.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::identity::catalog::ComponentRef;
use crate::identity::set::IdentitySet;
use crate::registry::{ComponentRegistry, ComponentState, RegistryError, RegistryResult};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Component registry stored in the `component_states` table.
pub struct SqliteComponentRegistry {
    conn: Mutex<Connection>,
}

impl SqliteComponentRegistry {
    /// Opens (and migrates) a registry file.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Seeds install-time state for every identity in `set`.
    ///
    /// Only `default` starts enabled. Rows that already exist are left
    /// untouched. Returns how many components were newly recorded.
    pub fn install(&self, set: &IdentitySet) -> RegistryResult<usize> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let mut inserted = 0;
        for entry in set.entries() {
            let state = if entry.identity.is_default() {
                ComponentState::Enabled
            } else {
                ComponentState::Disabled
            };
            inserted += tx.execute(
                "INSERT OR IGNORE INTO component_states (component, enabled, updated_at)
                 VALUES (?1, ?2, ?3)",
                params![entry.component.flatten(), state_flag(state), now_epoch_ms()],
            )?;
        }
        tx.commit()?;

        if inserted > 0 {
            info!(
                "event=registry_install module=registry status=ok inserted={} total={}",
                inserted,
                set.len()
            );
        }
        Ok(inserted)
    }

    /// Records one component with an explicit state, replacing existing state.
    pub fn register(&self, component: &ComponentRef, state: ComponentState) -> RegistryResult<()> {
        self.lock().execute(
            "INSERT INTO component_states (component, enabled, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(component) DO UPDATE SET
                enabled = excluded.enabled,
                updated_at = excluded.updated_at",
            params![component.flatten(), state_flag(state), now_epoch_ms()],
        )?;
        Ok(())
    }

    /// All recorded components, sorted by key.
    pub fn components(&self) -> RegistryResult<Vec<(ComponentRef, ComponentState)>> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT component, enabled FROM component_states ORDER BY component")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut components = Vec::new();
        for row in rows {
            let (raw, flag) = row?;
            let component = ComponentRef::unflatten(&raw).map_err(|err| {
                RegistryError::Unavailable(format!("invalid persisted component `{raw}`: {err}"))
            })?;
            components.push((component, parse_state_flag(flag)?));
        }
        Ok(components)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ComponentRegistry for SqliteComponentRegistry {
    fn set_component_state(
        &self,
        component: &ComponentRef,
        state: ComponentState,
    ) -> RegistryResult<()> {
        let changed = self.lock().execute(
            "UPDATE component_states SET enabled = ?1, updated_at = ?2 WHERE component = ?3",
            params![state_flag(state), now_epoch_ms(), component.flatten()],
        )?;
        if changed == 0 {
            return Err(RegistryError::NoSuchComponent(component.clone()));
        }
        Ok(())
    }

    fn component_state(&self, component: &ComponentRef) -> RegistryResult<ComponentState> {
        let flag = self
            .lock()
            .query_row(
                "SELECT enabled FROM component_states WHERE component = ?1",
                [component.flatten()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        match flag {
            Some(flag) => parse_state_flag(flag),
            None => Err(RegistryError::NoSuchComponent(component.clone())),
        }
    }
}

fn state_flag(state: ComponentState) -> i64 {
    match state {
        ComponentState::Enabled => 1,
        ComponentState::Disabled => 0,
    }
}

fn parse_state_flag(flag: i64) -> RegistryResult<ComponentState> {
    match flag {
        1 => Ok(ComponentState::Enabled),
        0 => Ok(ComponentState::Disabled),
        other => Err(RegistryError::Unavailable(format!(
            "invalid persisted enabled flag: {other}"
        ))),
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(epoch_ms)
        .unwrap_or_default()
}

/// Saturates instead of wrapping once milliseconds exceed `i64`.
fn epoch_ms(elapsed: Duration) -> i64 {
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::{epoch_ms, SqliteComponentRegistry};
    use crate::identity::catalog::{ComponentRef, LauncherIdentity};
    use crate::identity::set::IdentitySet;
    use crate::registry::{ComponentRegistry, ComponentState, RegistryError};
    use std::time::Duration;

    #[test]
    fn install_seeds_default_enabled_once() {
        let set = IdentitySet::builtin().expect("builtin set");
        let registry = SqliteComponentRegistry::open_in_memory().expect("open registry");

        assert_eq!(registry.install(&set).expect("first install"), set.len());
        let notes = &set.get(LauncherIdentity::Notes).expect("notes").component;
        registry.enable(notes).expect("enable notes");

        assert_eq!(registry.install(&set).expect("second install"), 0);
        assert_eq!(
            registry.component_state(notes).expect("notes state"),
            ComponentState::Enabled
        );
        assert_eq!(
            registry
                .component_state(&set.default_entry().component)
                .expect("default state"),
            ComponentState::Enabled
        );
    }

    #[test]
    fn unknown_component_is_rejected() {
        let registry = SqliteComponentRegistry::open_in_memory().expect("open registry");
        let component = ComponentRef::new("com.example", "com.example.Missing").expect("ref");

        assert_eq!(
            registry
                .set_component_state(&component, ComponentState::Enabled)
                .expect_err("unknown must fail"),
            RegistryError::NoSuchComponent(component.clone())
        );
        assert!(matches!(
            registry.component_state(&component),
            Err(RegistryError::NoSuchComponent(_))
        ));
    }

    #[test]
    fn register_replaces_state_and_components_lists_sorted() {
        let registry = SqliteComponentRegistry::open_in_memory().expect("open registry");
        let b = ComponentRef::new("com.example", "com.example.B").expect("ref");
        let a = ComponentRef::new("com.example", "com.example.A").expect("ref");

        registry.register(&b, ComponentState::Enabled).expect("register b");
        registry.register(&a, ComponentState::Enabled).expect("register a");
        registry.register(&a, ComponentState::Disabled).expect("re-register a");

        assert_eq!(
            registry.components().expect("components"),
            vec![(a, ComponentState::Disabled), (b, ComponentState::Enabled)]
        );
    }

    #[test]
    fn epoch_ms_saturates_on_overflow() {
        assert_eq!(epoch_ms(Duration::from_millis(1_700_000_000_000)), 1_700_000_000_000);
        assert_eq!(epoch_ms(Duration::MAX), i64::MAX);
    }
}
