//! Registry schema bootstrap.
//!
//! The registry has a single table, so the schema is either absent
//! (`user_version = 0`), current, or written by a newer binary.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Schema version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

const COMPONENT_STATES_SQL: &str = include_str!("component_states.sql");

/// Creates the registry schema when missing.
///
/// # Errors
/// - `SchemaTooNew` when the file was written by a newer binary; the file is
///   left untouched.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let found = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    match found {
        SCHEMA_VERSION => Ok(()),
        0 => {
            let tx = conn.transaction()?;
            tx.execute_batch(COMPONENT_STATES_SQL)?;
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            tx.commit()?;
            Ok(())
        }
        found => Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        }),
    }
}
