// SPDX-License-Identifier: MIT
//! statewire-bus: the local datagram fabric (§4.1 accelerator, §6). Carries
//! two frame kinds over Unix datagram sockets — [`statewire_core::EventFrame`]
//! between machines and [`statewire_core::RealtimeFrame`] from every machine
//! to the broadcaster — as a low-latency wake-up hint layered on top of the
//! store's durable mailbox, which remains the source of truth.

pub mod channel;
pub mod error;
pub mod paths;

pub use channel::DatagramChannel;
pub use error::BusError;
pub use paths::{broadcaster_socket_path, machine_socket_path};
