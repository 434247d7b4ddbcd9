//! Database repositories for data access layer

pub mod officer;
pub mod photo;
pub mod report;
pub mod telegram;

/// True if the error is a PostgreSQL unique-constraint violation (SQLSTATE 23505).
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}
