// SPDX-License-Identifier: MIT
//! BroadcastError: process-fatal failures (bind failures). Per-client send
//! failures never surface here — they just evict that client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("failed to bind TCP listener on {addr}: {source}")]
    TcpBind { addr: std::net::SocketAddr, source: std::io::Error },

    #[error("datagram bus error: {0}")]
    Bus(#[from] statewire_bus::BusError),

    #[error("store error: {0}")]
    Store(#[from] statewire_store::StoreError),
}
