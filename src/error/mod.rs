use std::collections::HashMap;
use std::fmt;
use std::io::Error as IoError;

use serde::Serialize;
use serde_json::Error as SerdeJsonError;
use sqlx::Error as SqlxError;

/// A dump failure with a stable code and the context it happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppError {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    context: HashMap<String, String>,
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    /// A user-scoped dump was requested without a resolvable user.
    pub const UNAUTHORIZED_CODE: &'static str = "DUMP/UNAUTHORIZED";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        AppError {
            code: code.into(),
            message: message.into(),
            context: HashMap::new(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn context(&self) -> &HashMap<String, String> {
        &self.context
    }

    /// Record where the failure happened; a later value for the same key wins.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code == Self::UNAUTHORIZED_CODE
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.context.is_empty() {
            let mut pairs: Vec<_> = self.context.iter().collect();
            pairs.sort();
            let rendered: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, " ({})", rendered.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<IoError> for AppError {
    fn from(error: IoError) -> Self {
        let app_error = AppError::new(format!("IO/{:?}", error.kind()), error.to_string());
        match error.raw_os_error() {
            Some(os_code) => app_error.with_context("os_code", os_code.to_string()),
            None => app_error,
        }
    }
}

impl From<SerdeJsonError> for AppError {
    fn from(error: SerdeJsonError) -> Self {
        let code = if error.is_io() { "JSON/IO" } else { "JSON/ERROR" };
        AppError::new(code, error.to_string())
    }
}

impl From<SqlxError> for AppError {
    fn from(error: SqlxError) -> Self {
        match error {
            SqlxError::RowNotFound => AppError::new("SQLX/ROW_NOT_FOUND", "Record not found"),
            SqlxError::ColumnNotFound(name) => {
                AppError::new("SQLX/COLUMN_NOT_FOUND", format!("Column not found: {name}"))
            }
            SqlxError::PoolTimedOut => AppError::new(
                "SQLX/POOL_TIMEOUT",
                "Timed out acquiring a database connection",
            ),
            SqlxError::PoolClosed => AppError::new("SQLX/POOL_CLOSED", "Database pool is closed"),
            SqlxError::Io(err) => AppError::from(err).with_context("source", "sqlx"),
            SqlxError::Database(db) => {
                let code = db
                    .code()
                    .map(|code| format!("Sqlite/{code}"))
                    .unwrap_or_else(|| "SQLX/DATABASE".to_string());
                AppError::new(code, db.message().to_string())
            }
            SqlxError::ColumnDecode { index, source } => {
                AppError::new("SQLX/COLUMN_DECODE", source.to_string())
                    .with_context("column_index", index.to_string())
            }
            other => AppError::new("SQLX/ERROR", other.to_string()),
        }
    }
}
