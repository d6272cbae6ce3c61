// SPDX-License-Identifier: MIT
//! `statewire diagram` — the pre-generated diagram/metadata HTTP process (C8).

use std::sync::Arc;

use statewire_diagram::DiagramStore;
use tokio_util::sync::CancellationToken;

use crate::cli::DiagramArgs;
use crate::exit_error::ExitError;

pub async fn run(args: DiagramArgs) -> Result<(), ExitError> {
    let store = Arc::new(DiagramStore::new(crate::env::diagrams_dir()));
    let port = args.port.unwrap_or_else(crate::env::diagram_port);
    let bind_addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let shutdown = CancellationToken::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        signal_shutdown.cancel();
    });

    statewire_diagram::run(store, bind_addr, shutdown).await.map_err(|err| ExitError::unhandled(err.to_string()))
}
