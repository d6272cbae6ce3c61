// SPDX-License-Identifier: MIT
//! Error kinds owned by the core crate (§7: ConfigError lives in `statewire-config`,
//! these are the ones plain domain-type parsing can raise).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid job status: {0}")]
    InvalidJobStatus(String),
}
