// SPDX-License-Identifier: MIT
//! The standalone fan-out process (C7, §4.5): one shared datagram inbox,
//! many WebSocket clients. Serialization happens exactly once per frame,
//! strictly before any client send is awaited (Testable Property 6).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use statewire_bus::DatagramChannel;
use statewire_core::{FrameKind, RealtimeFrame};
use statewire_store::Store;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::clients::ClientRegistry;
use crate::error::BroadcastError;

/// Keepalive ping cadence (§4.5 "≈10s").
const PING_INTERVAL: Duration = Duration::from_secs(10);
/// How many recent realtime frames a newly-connected client is replayed.
const SNAPSHOT_BACKLOG: i64 = 200;
/// How long the fan-out loop may go quiet before the watchdog logs (§4.5 "~15s").
const WATCHDOG_STALE_AFTER: Duration = Duration::from_secs(15);

pub struct Broadcaster {
    socket_path: PathBuf,
    bind_addr: SocketAddr,
    store: Arc<Store>,
    registry: Arc<ClientRegistry>,
    heartbeat_ms: Arc<AtomicU64>,
}

impl Broadcaster {
    pub fn new(socket_path: PathBuf, bind_addr: SocketAddr, store: Arc<Store>) -> Self {
        Self {
            socket_path,
            bind_addr,
            store,
            registry: Arc::new(ClientRegistry::default()),
            heartbeat_ms: Arc::new(AtomicU64::new(now_ms())),
        }
    }

    /// Run the accept loop and the datagram fan-out loop side by side until
    /// `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), BroadcastError> {
        let listener = TcpListener::bind(self.bind_addr)
            .await
            .map_err(|source| BroadcastError::TcpBind { addr: self.bind_addr, source })?;
        let inbound = DatagramChannel::<RealtimeFrame>::bind(&self.socket_path)?;

        let watchdog = spawn_watchdog(self.heartbeat_ms.clone(), shutdown.clone());
        let accept = self.spawn_accept_loop(listener, shutdown.clone());
        let fan_out = self.run_fan_out_loop(inbound, shutdown.clone());

        fan_out.await;
        accept.abort();
        watchdog.abort();
        Ok(())
    }

    fn spawn_accept_loop(&self, listener: TcpListener, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        let store = self.store.clone();
        let registry = self.registry.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    accepted = listener.accept() => {
                        match accepted {
                            Ok((stream, peer)) => {
                                let store = store.clone();
                                let registry = registry.clone();
                                let shutdown = shutdown.clone();
                                tokio::spawn(async move {
                                    if let Err(err) = handle_client(stream, peer, store, registry, shutdown).await {
                                        tracing::debug!(%peer, error = %err, "websocket client session ended with error");
                                    }
                                });
                            }
                            Err(err) => tracing::warn!(error = %err, "accept failed"),
                        }
                    }
                }
            }
        })
    }

    async fn run_fan_out_loop(&self, inbound: DatagramChannel<RealtimeFrame>, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = inbound.recv() => {
                    self.heartbeat_ms.store(now_ms(), Ordering::Relaxed);
                    match received {
                        Ok(frame) => {
                            if let Err(err) = self.store.record_realtime_event(&frame).await {
                                tracing::debug!(error = %err, "failed to persist inbound realtime frame");
                            }
                            // Serialized once, here, before any client send is awaited.
                            match serde_json::to_string(&frame) {
                                Ok(text) => self.registry.fan_out_text(&text).await,
                                Err(err) => tracing::warn!(error = %err, "failed to serialize realtime frame"),
                            }
                        }
                        Err(err) => tracing::debug!(error = %err, "inbound datagram decode failed"),
                    }
                }
            }
        }
    }
}

async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    store: Arc<Store>,
    registry: Arc<ClientRegistry>,
    shutdown: CancellationToken,
) -> Result<(), BroadcastError> {
    let ws_stream = tokio_tungstenite::accept_async(stream)
        .await
        .map_err(|err| BroadcastError::TcpBind { addr: peer, source: std::io::Error::other(err) })?;
    let (mut sink, mut stream) = ws_stream.split();

    let (tx, mut rx) = mpsc::channel::<Message>(64);
    let snapshot = build_snapshot_frame(&store).await?;
    if let Ok(text) = serde_json::to_string(&snapshot) {
        let _ = tx.send(Message::Text(text.into())).await;
    }
    let client_id = registry.register(tx.clone());
    tracing::info!(%peer, "websocket client connected");

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    let keepalive = {
        let tx = tx.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PING_INTERVAL);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        let frame = RealtimeFrame::ping(now_secs());
                        let Ok(text) = serde_json::to_string(&frame) else { continue };
                        if tx.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                }
            }
        })
    };

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Text(text))) => {
                        if is_refresh_request(&text) {
                            if let Ok(snapshot) = build_snapshot_frame(&store).await {
                                if let Ok(text) = serde_json::to_string(&snapshot) {
                                    let _ = tx.send(Message::Text(text.into())).await;
                                }
                            }
                        }
                    }
                    Some(Ok(_)) => {} // pongs and anything else are not acted on
                    Some(Err(_)) => break,
                }
            }
        }
    }

    keepalive.abort();
    writer.abort();
    registry.remove(client_id);
    tracing::info!(%peer, "websocket client disconnected");
    Ok(())
}

/// `{"type":"refresh"}` from a client asks for a fresh initial snapshot
/// (§6 "WebSocket surface"); anything else inbound is ignored.
fn is_refresh_request(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).ok().and_then(|v| v.get("type")?.as_str().map(str::to_string))
        == Some("refresh".to_string())
}

async fn build_snapshot_frame(store: &Store) -> Result<RealtimeFrame, BroadcastError> {
    let machines = store.list_machine_states().await?;
    let recent = store.list_recent_realtime_events(SNAPSHOT_BACKLOG).await?;
    Ok(RealtimeFrame {
        kind: FrameKind::Initial,
        machine_name: None,
        payload: serde_json::json!({
            "machines": machines,
            "recent_events": recent,
        }),
        timestamp: now_secs(),
    })
}

fn now_secs() -> f64 {
    now_ms() as f64 / 1000.0
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Polls the fan-out loop's last-progress timestamp; if it goes stale past
/// [`WATCHDOG_STALE_AFTER`], logs a diagnostic warning. A full per-thread
/// stack dump (as a native daemon might trigger via a signal handler) would
/// need `unsafe`, forbidden workspace-wide, so this degrades to a staleness
/// log instead — still useful as the "is the loop even running" signal.
fn spawn_watchdog(heartbeat_ms: Arc<AtomicU64>, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let poll_interval = Duration::from_secs(5);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(poll_interval) => {
                    let elapsed_ms = now_ms().saturating_sub(heartbeat_ms.load(Ordering::Relaxed));
                    if elapsed_ms > WATCHDOG_STALE_AFTER.as_millis() as u64 {
                        tracing::warn!(elapsed_ms, "broadcaster fan-out loop has not made progress recently");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "broadcaster_tests.rs"]
mod tests;
