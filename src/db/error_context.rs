//! Extracts the useful parts of a PostgreSQL error so comment failures read
//! like the server reported them, including detail and hint lines.

use std::fmt;

use sqlx::postgres::PgDatabaseError;

/// Error context extracted from a driver error
#[derive(Debug, Clone)]
pub struct SqlErrorContext {
    /// The primary error message
    pub message: String,
    /// Additional detail from PostgreSQL
    pub detail: Option<String>,
    /// Hint for fixing the error
    pub hint: Option<String>,
    /// PostgreSQL error code (e.g., "42704" for undefined_object)
    pub code: Option<String>,
}

impl SqlErrorContext {
    /// Uses structured data from PgDatabaseError when the server produced the error.
    pub fn from_sqlx_error(error: &sqlx::Error) -> Self {
        if let Some(db_error) = error.as_database_error()
            && let Some(pg_error) = db_error.try_downcast_ref::<PgDatabaseError>()
        {
            return Self {
                message: pg_error.message().to_string(),
                detail: pg_error.detail().map(|s| s.to_string()),
                hint: pg_error.hint().map(|s| s.to_string()),
                code: Some(pg_error.code().to_string()),
            };
        }

        // Fallback for client-side errors (I/O, protocol, pool)
        Self {
            message: error.to_string(),
            detail: None,
            hint: None,
            code: None,
        }
    }
}

impl fmt::Display for SqlErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (SQLSTATE {})", code)?;
        }
        if let Some(detail) = &self.detail {
            write!(f, "\n  Detail: {}", detail)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\n  Hint: {}", hint)?;
        }
        Ok(())
    }
}
