// SPDX-License-Identifier: MIT
//! `statewire engine run` (§6 "Run an engine").

use std::sync::Arc;

use statewire_actions::{ActionDeps, ActionRegistry};
use statewire_config::MachineDefinition;
use statewire_core::SystemClock;
use statewire_engine::Engine;
use statewire_store::Store;
use tokio_util::sync::CancellationToken;

use crate::cli::EngineRunArgs;
use crate::exit_error::ExitError;

pub async fn run(args: EngineRunArgs) -> Result<(), ExitError> {
    let yaml = std::fs::read_to_string(&args.config)
        .map_err(|err| ExitError::usage(format!("failed to read {:?}: {err}", args.config)))?;
    let definition = MachineDefinition::from_yaml_str(&yaml).map_err(|err| ExitError::usage(err.to_string()))?;
    let machine_name = definition.effective_machine_name(args.machine_name.as_deref()).to_string();

    let initial_context = match args.initial_context {
        Some(raw) => serde_json::from_str::<serde_json::Value>(&raw)
            .map_err(|err| ExitError::usage(format!("--initial-context is not valid JSON: {err}")))?
            .as_object()
            .cloned()
            .ok_or_else(|| ExitError::usage("--initial-context must be a JSON object"))?,
        None => serde_json::Map::new(),
    };

    let store_path = crate::env::store_path();
    if let Some(parent) = store_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let store = Arc::new(Store::open(&store_path).await.map_err(|err| ExitError::unhandled(err.to_string()))?);

    let socket_dir = crate::env::socket_dir();
    let deps = ActionDeps {
        store,
        outbound_events: Arc::new(
            statewire_bus::DatagramChannel::unbound().map_err(|err| ExitError::unhandled(err.to_string()))?,
        ),
        outbound_realtime: Arc::new(
            statewire_bus::DatagramChannel::unbound().map_err(|err| ExitError::unhandled(err.to_string()))?,
        ),
        socket_dir,
        clock: SystemClock,
    };

    let registry = ActionRegistry::with_builtins();
    let engine = Engine::new(definition, machine_name.clone(), registry, deps, initial_context)
        .map_err(|err| ExitError::unhandled(err.to_string()))?;

    tracing::info!(machine_name = %machine_name, state = %engine.current_state(), "engine starting");

    let shutdown = CancellationToken::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        signal_shutdown.cancel();
    });

    engine.run(shutdown).await.map_err(|err| ExitError::unhandled(err.to_string()))
}
