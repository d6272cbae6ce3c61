// SPDX-License-Identifier: MIT
//! StoreError (§7, kind 2): the embedded database rejected or could not
//! service an operation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("job {0} not found")]
    JobNotFound(String),

    #[error("malformed json in column {column}: {source}")]
    MalformedJson { column: &'static str, source: serde_json::Error },
}
