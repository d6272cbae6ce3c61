// SPDX-License-Identifier: MIT
//! `statewire ui` — the standalone broadcaster entrypoint (§6 "Broadcaster entrypoint").

use std::sync::Arc;

use statewire_broadcaster::Broadcaster;
use statewire_store::Store;
use tokio_util::sync::CancellationToken;

use crate::cli::UiArgs;
use crate::exit_error::ExitError;

pub async fn run(args: UiArgs) -> Result<(), ExitError> {
    let store_path = crate::env::store_path();
    if let Some(parent) = store_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let store = Arc::new(Store::open(&store_path).await.map_err(|err| ExitError::unhandled(err.to_string()))?);

    let port = args.port.unwrap_or_else(crate::env::websocket_port);
    let bind_addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let socket_path = statewire_bus::broadcaster_socket_path(&crate::env::socket_dir());

    let shutdown = CancellationToken::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        signal_shutdown.cancel();
    });

    tracing::info!(%bind_addr, socket = %socket_path.display(), "broadcaster starting");
    Broadcaster::new(socket_path, bind_addr, store)
        .run(shutdown)
        .await
        .map_err(|err| ExitError::unhandled(err.to_string()))
}
