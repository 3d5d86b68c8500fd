//! Storage error types

use thiserror::Error;

/// Errors surfaced by the storage layer.
///
/// Row absence is not an error here: lookup methods return `Option` and the
/// callers decide what "not found" means in their scope. Everything in this
/// enum is an infrastructure failure and maps to a 500 at the API surface.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Underlying storage refused or lost the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A row violated an invariant the schema should have enforced.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}
