// SPDX-License-Identifier: MIT
//! `log`: emit a structured log record through the ordinary `tracing`
//! pipeline and a realtime `log` frame for connected UI clients — one
//! user-facing action, one underlying logging facility.

use async_trait::async_trait;
use statewire_config::ActionConfig;
use statewire_core::context::keys;
use statewire_core::{Clock, ExecutionContext, RealtimeFrame};

use crate::action::{require_str, str_or, Action};
use crate::deps::ActionDeps;
use crate::error::ActionError;

pub struct Log;

#[async_trait]
impl<C: Clock> Action<C> for Log {
    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &mut ExecutionContext,
        deps: &ActionDeps<C>,
    ) -> Result<String, ActionError> {
        let message = require_str(config, "log", "message")?;
        let level = str_or(config, "level", "info");
        let machine_name =
            ctx.get(keys::MACHINE_NAME).and_then(|v| v.as_str()).unwrap_or_default().to_string();

        match level {
            "warn" => tracing::warn!(machine = %machine_name, "{message}"),
            "error" => tracing::error!(machine = %machine_name, "{message}"),
            "debug" => tracing::debug!(machine = %machine_name, "{message}"),
            _ => tracing::info!(machine = %machine_name, "{message}"),
        }

        let frame = RealtimeFrame::log(&machine_name, message, level, deps.clock.epoch_secs_f64());
        if let Err(err) = deps.outbound_realtime.send_to(&deps.broadcaster_socket_path(), &frame).await {
            tracing::debug!(error = %err, "realtime log frame not delivered");
        }

        Ok("success".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statewire_core::FakeClock;
    use statewire_store::Store;
    use std::sync::Arc;

    #[tokio::test]
    async fn always_reports_success() {
        let store = Arc::new(Store::open_in_memory().await.unwrap());
        let dir = tempfile::tempdir().unwrap();
        let deps = ActionDeps {
            store,
            outbound_events: Arc::new(statewire_bus::DatagramChannel::unbound().unwrap()),
            outbound_realtime: Arc::new(statewire_bus::DatagramChannel::unbound().unwrap()),
            socket_dir: dir.into_path(),
            clock: FakeClock::new(1_000),
        };
        let mut ctx = ExecutionContext::new("m");
        let cfg = ActionConfig {
            action_type: "log".to_string(),
            success: None,
            error: None,
            params: serde_json::json!({"message": "hello", "level": "warn"}).as_object().cloned().unwrap(),
        };
        assert_eq!(Log.execute(&cfg, &mut ctx, &deps).await.unwrap(), "success");
    }
}
