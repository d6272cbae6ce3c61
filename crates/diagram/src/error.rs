// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("no pre-generated diagram artifact found for {0:?}")]
    NotFound(String),
    #[error("failed to read diagram artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed diagram metadata: {0}")]
    Json(#[from] serde_json::Error),
}
