//! Database error categorisation.
//!
//! sea-orm surfaces driver failures as strings inside `DbErr`; this module
//! sorts them into the handful of cases the API distinguishes.

use sea_orm::DbErr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    /// Query returned no row where one was required.
    NotFound,
    /// Unique index or primary key collision.
    UniqueViolation,
    /// Reference to a row that does not exist.
    ForeignKeyViolation,
    ConnectionError,
    /// SQLite lock held by another writer.
    Busy,
    Timeout,
    Unknown,
}

impl DbErrorKind {
    pub fn from_db_err(err: &DbErr) -> Self {
        if let DbErr::RecordNotFound(_) = err {
            return Self::NotFound;
        }

        let message = err.to_string().to_lowercase();
        if message.contains("database is locked") || message.contains("database is busy") {
            Self::Busy
        } else if message.contains("timeout") || message.contains("timed out") {
            Self::Timeout
        } else if matches!(err, DbErr::Conn(_)) {
            Self::ConnectionError
        } else if message.contains("unique") || message.contains("duplicate") {
            Self::UniqueViolation
        } else if message.contains("foreign key") || message.contains("fk_") {
            Self::ForeignKeyViolation
        } else {
            Self::Unknown
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::UniqueViolation | Self::ForeignKeyViolation
        )
    }
}

/// Categorise `err` and phrase it with the operation that failed.
pub fn format_db_error(operation: &str, err: &DbErr) -> (DbErrorKind, String) {
    let kind = DbErrorKind::from_db_err(err);

    let message = match kind {
        DbErrorKind::NotFound => format!("{}: record not found", operation),
        DbErrorKind::UniqueViolation => format!("{}: duplicate key violation", operation),
        DbErrorKind::ForeignKeyViolation => {
            format!("{}: foreign key constraint violation", operation)
        }
        DbErrorKind::ConnectionError => format!("{}: database connection failed", operation),
        DbErrorKind::Busy => format!("{}: database is busy, try again", operation),
        DbErrorKind::Timeout => format!("{}: query timeout", operation),
        DbErrorKind::Unknown => format!("{}: database error - {}", operation, err),
    };

    (kind, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_key_failures_are_client_errors() {
        let err = DbErr::Custom("FOREIGN KEY constraint failed".to_string());
        let (kind, message) = format_db_error("create heuristic", &err);
        assert_eq!(kind, DbErrorKind::ForeignKeyViolation);
        assert!(kind.is_client_error());
        assert_eq!(message, "create heuristic: foreign key constraint violation");
    }

    #[test]
    fn lock_contention_is_busy() {
        let err = DbErr::Exec(sea_orm::RuntimeErr::Internal(
            "error returned from database: (code: 5) database is locked".to_string(),
        ));
        let (kind, message) = format_db_error("create task", &err);
        assert_eq!(kind, DbErrorKind::Busy);
        assert!(!kind.is_client_error());
        assert_eq!(message, "create task: database is busy, try again");
    }

    #[test]
    fn unrecognised_failures_keep_the_driver_text() {
        let err = DbErr::Custom("disk I/O error".to_string());
        let (kind, message) = format_db_error("save block", &err);
        assert_eq!(kind, DbErrorKind::Unknown);
        assert!(message.contains("disk I/O error"));
    }
}
