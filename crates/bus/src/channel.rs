// SPDX-License-Identifier: MIT
//! Generic fire-and-forget JSON-over-`UnixDatagram` channel. Used for two
//! distinct frame types on two distinct sockets: [`statewire_core::EventFrame`]
//! (machine-to-machine wake-ups) and [`statewire_core::RealtimeFrame`]
//! (machine-to-broadcaster telemetry).

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::UnixDatagram;

use crate::error::BusError;

/// Datagrams larger than this are rejected before the syscall rather than
/// silently truncated by the kernel.
const MAX_FRAME_BYTES: usize = 64 * 1024;

/// A bound datagram socket, generic over the frame type it carries.
pub struct DatagramChannel<T> {
    socket: UnixDatagram,
    _frame: std::marker::PhantomData<T>,
}

impl<T> DatagramChannel<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Bind a fresh socket at `path`, removing any stale socket file left
    /// behind by a previous, uncleanly-terminated process.
    pub fn bind(path: &Path) -> Result<Self, BusError> {
        let _ = std::fs::remove_file(path);
        let socket = UnixDatagram::bind(path)?;
        Ok(Self { socket, _frame: std::marker::PhantomData })
    }

    /// An unbound socket suitable only for sending (no local address).
    pub fn unbound() -> Result<Self, BusError> {
        let socket = UnixDatagram::unbound()?;
        Ok(Self { socket, _frame: std::marker::PhantomData })
    }

    /// Best-effort send: failures (socket gone, peer not listening yet) are
    /// returned to the caller to log, never to block or retry here — the
    /// durable mailbox is what guarantees delivery.
    pub async fn send_to(&self, target: &Path, frame: &T) -> Result<(), BusError> {
        let bytes = serde_json::to_vec(frame).map_err(BusError::Encode)?;
        if bytes.len() > MAX_FRAME_BYTES {
            return Err(BusError::FrameTooLarge(bytes.len()));
        }
        self.socket.send_to(&bytes, target).await?;
        Ok(())
    }

    /// Wait for and decode the next datagram.
    pub async fn recv(&self) -> Result<T, BusError> {
        let mut buf = vec![0u8; MAX_FRAME_BYTES];
        let n = self.socket.recv(&mut buf).await?;
        serde_json::from_slice(&buf[..n]).map_err(BusError::Decode)
    }
}
