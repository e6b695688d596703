//! Store error model and SQLx error mapping.
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (foreign key violation) | `23503` | `Referenced` |
//! | Database (other) | Any other | `Database` |
//! | RowNotFound | N/A | `Database` |
//! | Other | N/A | `Database` |

use thiserror::Error;

use storefront_core::VariantId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// The database refused a delete because an order line still points at the row.
    #[error("variant still referenced in {operation}: {message}")]
    Referenced {
        operation: &'static str,
        message: String,
    },

    #[error("failed to decode stored variant: {0}")]
    Decode(String),

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("variant not found: {0}")]
    NotFound(VariantId),

    #[error("lock poisoned")]
    LockPoisoned,
}

pub(crate) fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_string();
            match db_err.code().as_deref() {
                Some("23503") => StoreError::Referenced { operation, message },
                _ => StoreError::Database { operation, message },
            }
        }
        other => StoreError::Database {
            operation,
            message: other.to_string(),
        },
    }
}
