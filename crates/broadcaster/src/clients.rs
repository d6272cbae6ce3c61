// SPDX-License-Identifier: MIT
//! Connected-client registry and fan-out (§4.5, Testable Property 6): every
//! frame is serialized exactly once before any send is awaited, then handed
//! to each client's own mpsc queue so one slow client can never stall
//! delivery to the others.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

pub type ClientId = u64;

/// Per-send timeout before a client is considered dead (§4.5 "≈2s").
pub const SEND_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Default)]
pub struct ClientRegistry {
    next_id: AtomicU64,
    clients: Mutex<HashMap<ClientId, mpsc::Sender<Message>>>,
}

impl ClientRegistry {
    pub fn register(&self, sender: mpsc::Sender<Message>) -> ClientId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.clients.lock().insert(id, sender);
        id
    }

    pub fn remove(&self, id: ClientId) {
        self.clients.lock().remove(&id);
    }

    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    /// Broadcast an already-serialized text frame to every connected client,
    /// evicting any client whose queue doesn't drain within [`SEND_TIMEOUT`].
    pub async fn fan_out_text(&self, text: &str) {
        let targets: Vec<(ClientId, mpsc::Sender<Message>)> =
            self.clients.lock().iter().map(|(id, tx)| (*id, tx.clone())).collect();

        let mut dead = Vec::new();
        for (id, tx) in targets {
            let message = Message::Text(text.to_string().into());
            match tokio::time::timeout(SEND_TIMEOUT, tx.send(message)).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) | Err(_) => dead.push(id),
            }
        }
        if !dead.is_empty() {
            let mut guard = self.clients.lock();
            for id in dead {
                guard.remove(&id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fan_out_delivers_to_every_registered_client() {
        let registry = ClientRegistry::default();
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        registry.register(tx_a);
        registry.register(tx_b);

        registry.fan_out_text("hello").await;

        assert_eq!(rx_a.recv().await, Some(Message::Text("hello".into())));
        assert_eq!(rx_b.recv().await, Some(Message::Text("hello".into())));
    }

    #[tokio::test]
    async fn fan_out_evicts_a_client_whose_receiver_was_dropped() {
        let registry = ClientRegistry::default();
        let (tx, rx) = mpsc::channel(4);
        let id = registry.register(tx);
        drop(rx);

        registry.fan_out_text("hello").await;

        assert_eq!(registry.len(), 0);
        let _ = id;
    }
}
