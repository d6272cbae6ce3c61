// SPDX-License-Identifier: MIT
//! Shared handles every built-in action needs: the store, the datagram
//! fabric, where on disk peer sockets live, and a clock (so `bash`'s timeout
//! and every timestamp an action writes are deterministically testable).

use std::path::PathBuf;
use std::sync::Arc;

use statewire_bus::DatagramChannel;
use statewire_core::{Clock, EventFrame, RealtimeFrame};
use statewire_store::Store;

#[derive(Clone)]
pub struct ActionDeps<C: Clock> {
    pub store: Arc<Store>,
    pub outbound_events: Arc<DatagramChannel<EventFrame>>,
    pub outbound_realtime: Arc<DatagramChannel<RealtimeFrame>>,
    pub socket_dir: PathBuf,
    pub clock: C,
}

impl<C: Clock> ActionDeps<C> {
    pub fn machine_socket_path(&self, machine_name: &str) -> PathBuf {
        statewire_bus::machine_socket_path(&self.socket_dir, machine_name)
    }

    pub fn broadcaster_socket_path(&self) -> PathBuf {
        statewire_bus::broadcaster_socket_path(&self.socket_dir)
    }
}
