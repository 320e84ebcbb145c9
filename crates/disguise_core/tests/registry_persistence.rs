use disguise_core::db::schema::SCHEMA_VERSION;
use disguise_core::db::{open_db, open_db_in_memory, DbError};
use disguise_core::{
    ActivationManager, ComponentState, HealOutcome, IdentitySet, LauncherIdentity,
    SqliteComponentRegistry,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_registry_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    assert_table_exists(&conn, "component_states");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match SqliteComponentRegistry::open(&path) {
        Err(DbError::SchemaTooNew { found, supported }) => {
            assert_eq!(found, 999);
            assert_eq!(supported, SCHEMA_VERSION);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("newer schema must be rejected"),
    }
}

#[test]
fn active_identity_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");
    let set = IdentitySet::builtin().unwrap();

    {
        let registry = SqliteComponentRegistry::open(&path).unwrap();
        registry.install(&set).unwrap();
        let manager = ActivationManager::new(set.clone(), registry);
        let outcome = manager.activate(Some("weather")).unwrap();
        assert_eq!(outcome.identity, LauncherIdentity::Weather);
    }

    let registry = SqliteComponentRegistry::open(&path).unwrap();
    assert_eq!(registry.install(&set).unwrap(), 0);
    let manager = ActivationManager::new(set, registry);
    assert_eq!(
        manager.snapshot().unwrap().active(),
        Some(LauncherIdentity::Weather)
    );
}

#[test]
fn self_heal_repairs_registry_left_half_swept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crashed.db");
    let set = IdentitySet::builtin().unwrap();

    {
        // Simulate a crash after the disable sweep, before the final enable.
        let registry = SqliteComponentRegistry::open(&path).unwrap();
        registry.install(&set).unwrap();
        for entry in set.entries() {
            registry
                .register(&entry.component, ComponentState::Disabled)
                .unwrap();
        }
    }

    let registry = SqliteComponentRegistry::open(&path).unwrap();
    let manager = ActivationManager::new(set, registry);
    assert!(manager.snapshot().unwrap().enabled().is_empty());

    match manager.self_heal().unwrap() {
        HealOutcome::Repaired {
            previously_enabled,
            outcome,
        } => {
            assert!(previously_enabled.is_empty());
            assert_eq!(outcome.identity, LauncherIdentity::Default);
        }
        other => panic!("unexpected heal outcome: {other:?}"),
    }
    assert_eq!(
        manager.self_heal().unwrap(),
        HealOutcome::Consistent(LauncherIdentity::Default)
    );
}

#[test]
fn opening_same_registry_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), SCHEMA_VERSION);
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), SCHEMA_VERSION);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
