//! Driver-independent classification of constraint violations.
//!
//! Works for every backend behind the `Any` driver because each driver
//! reports its native code through [`sqlx::error::DatabaseError::kind`].

use sqlx::mysql::MySqlDatabaseError;
use sqlx::sqlite::SqliteError;

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

pub fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
}

/// Lock contention the caller can retry: SQLite busy or locked, MySQL lock
/// wait timeout or deadlock, Postgres serialization failure or deadlock.
pub fn is_lock_conflict(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if let Some(err) = db_err.try_downcast_ref::<MySqlDatabaseError>() {
        return matches!(err.number(), 1205 | 1213);
    }

    let code = db_err.code();
    if db_err.try_downcast_ref::<SqliteError>().is_some() {
        // Extended result codes carry the primary code in the low byte.
        return code
            .and_then(|c| c.parse::<i32>().ok())
            .is_some_and(|c| matches!(c & 0xff, SQLITE_BUSY | SQLITE_LOCKED));
    }

    matches!(code.as_deref(), Some("40001" | "40P01"))
}
