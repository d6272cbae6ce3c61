// SPDX-License-Identifier: MIT
//! BusError: the datagram fabric could not bind, send, or decode a frame.
//! Never fatal to the engine loop — the store's mailbox remains the source
//! of truth, this fabric only shortens the wait for it (§11 open question 1).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("socket io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode frame: {0}")]
    Encode(serde_json::Error),

    #[error("failed to decode frame: {0}")]
    Decode(serde_json::Error),

    #[error("frame of {0} bytes exceeds the datagram limit")]
    FrameTooLarge(usize),
}
