// SPDX-License-Identifier: MIT
//! Socket path derivation for the local datagram fabric (§6). Every machine
//! gets its own inbound socket so an inter-machine `send_event` can target
//! it directly; the broadcaster listens on one well-known shared path.

use std::path::{Path, PathBuf};

/// Inbound datagram socket for a single machine's accelerator wake-ups.
pub fn machine_socket_path(socket_dir: &Path, machine_name: &str) -> PathBuf {
    socket_dir.join(format!("statewire-{machine_name}.sock"))
}

/// Shared socket the broadcaster listens on for realtime frames relayed by
/// every running machine.
pub fn broadcaster_socket_path(socket_dir: &Path) -> PathBuf {
    socket_dir.join("statewire-events.sock")
}
