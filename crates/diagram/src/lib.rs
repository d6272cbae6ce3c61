// SPDX-License-Identifier: MIT
//! statewire-diagram: the pre-generated diagram/metadata HTTP surface (C8).

pub mod error;
pub mod server;
pub mod store;

pub use error::DiagramError;
pub use store::{CompositeMembership, DiagramArtifact, DiagramMetadata, DiagramStore};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Binds `bind_addr` and serves the diagram HTTP surface until `shutdown` fires.
pub async fn run(store: Arc<DiagramStore>, bind_addr: SocketAddr, shutdown: CancellationToken) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(%bind_addr, "diagram provider listening");
    axum::serve(listener, server::router(store))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
