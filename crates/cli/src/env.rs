// SPDX-License-Identifier: MIT
//! Centralized environment variable access (§6 "Environment & paths").

use std::path::PathBuf;

/// Embedded database file. `STATEWIRE_STORE_PATH` overrides the default.
pub fn store_path() -> PathBuf {
    std::env::var("STATEWIRE_STORE_PATH").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("data/state.db"))
}

/// Directory holding the per-machine and broadcaster datagram sockets.
/// `STATEWIRE_SOCKET_DIR` overrides the default `/tmp`.
pub fn socket_dir() -> PathBuf {
    std::env::var("STATEWIRE_SOCKET_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("/tmp"))
}

/// WebSocket fan-out port (default 3002).
pub fn websocket_port() -> u16 {
    parse_port("STATEWIRE_WS_PORT", 3002)
}

/// Diagram provider HTTP port (default 3001).
pub fn diagram_port() -> u16 {
    parse_port("STATEWIRE_DIAGRAM_PORT", 3001)
}

/// Directory of pre-generated diagram artifacts the diagram provider serves.
pub fn diagrams_dir() -> PathBuf {
    std::env::var("STATEWIRE_DIAGRAMS_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("data/diagrams"))
}

fn parse_port(var: &str, default: u16) -> u16 {
    std::env::var(var).ok().and_then(|s| s.parse::<u16>().ok()).unwrap_or(default)
}
