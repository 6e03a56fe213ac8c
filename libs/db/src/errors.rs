//! Shared database error helpers.

use sea_orm::{DbErr, SqlErr};

/// Returns true if the given SQLSTATE code represents a unique constraint violation
/// across supported backends (Postgres 23505, SQLite 2067 / 1555).
pub fn is_unique_violation_code(code: &str) -> bool {
    matches!(code, "23505" | "2067" | "1555")
}

/// Whether a SeaORM error was raised by a unique index or primary key.
pub fn is_unique_violation(err: &DbErr) -> bool {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return true;
    }
    // Some drivers surface the violation only through the message.
    let msg = err.to_string().to_lowercase();
    msg.contains("unique constraint") || msg.contains("duplicate key")
}
