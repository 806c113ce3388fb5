use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the store and reporting layers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot open database {}: {source}", path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("constraint violation: {0}")]
    Constraint(#[source] rusqlite::Error),

    /// A write keyed by plate or document matched no row.
    #[error("no matching row")]
    NotFound,

    #[error("write affected {0} rows where exactly one was expected")]
    RowCount(usize),

    #[error("invalid price {0}: must be a finite, non-negative amount")]
    InvalidPrice(f64),

    #[error("database error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    #[error("report export failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Single conversion point so that `?` on any rusqlite call classifies
/// unique/foreign-key failures as `Constraint` instead of a bare store error.
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint(err)
            }
            _ => StoreError::Sqlite(err),
        }
    }
}

impl StoreError {
    pub fn is_constraint(&self) -> bool {
        matches!(self, StoreError::Constraint(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}
