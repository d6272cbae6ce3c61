// SPDX-License-Identifier: MIT
//! `clear_events`: drain matching unconsumed mailbox rows without acting on
//! them, e.g. to discard stale retries before entering a fresh state.

use async_trait::async_trait;
use statewire_config::ActionConfig;
use statewire_core::context::keys;
use statewire_core::{Clock, ExecutionContext};

use crate::action::{require_str_list, str_or, Action};
use crate::deps::ActionDeps;
use crate::error::ActionError;

pub struct ClearEvents;

#[async_trait]
impl<C: Clock> Action<C> for ClearEvents {
    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &mut ExecutionContext,
        deps: &ActionDeps<C>,
    ) -> Result<String, ActionError> {
        let event_types = require_str_list(config, "clear_events", "event_types")?;
        let machine_name =
            ctx.get(keys::MACHINE_NAME).and_then(|v| v.as_str()).unwrap_or_default().to_string();

        let pending = deps.store.get_pending_events(&machine_name).await?;
        let now_ms = deps.clock.epoch_ms();
        for event in pending.iter().filter(|e| event_types.iter().any(|t| t == &e.event_type)) {
            deps.store.mark_consumed(&event.id, now_ms).await?;
        }

        Ok(str_or(config, "success", "success").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statewire_core::{EventId, FakeClock, MachineEvent};
    use statewire_store::Store;
    use std::sync::Arc;

    #[tokio::test]
    async fn consumes_only_matching_event_types() {
        let store = Arc::new(Store::open_in_memory().await.unwrap());
        let dir = tempfile::tempdir().unwrap();
        let deps = ActionDeps {
            store,
            outbound_events: Arc::new(statewire_bus::DatagramChannel::unbound().unwrap()),
            outbound_realtime: Arc::new(statewire_bus::DatagramChannel::unbound().unwrap()),
            socket_dir: dir.into_path(),
            clock: FakeClock::new(1_000),
        };
        for event_type in ["stale_retry", "keep_me"] {
            deps.store
                .send_event(&MachineEvent {
                    id: EventId::new(),
                    target_machine: "worker-1".to_string(),
                    source_machine: "controller".to_string(),
                    event_type: event_type.to_string(),
                    job_id: None,
                    payload: serde_json::Value::Null,
                    created_at_ms: 1_000,
                    consumed_at_ms: None,
                })
                .await
                .unwrap();
        }

        let mut ctx = ExecutionContext::new("worker-1");
        let cfg = ActionConfig {
            action_type: "clear_events".to_string(),
            success: None,
            error: None,
            params: serde_json::json!({"event_types": ["stale_retry"]}).as_object().cloned().unwrap(),
        };
        let event = ClearEvents.execute(&cfg, &mut ctx, &deps).await.unwrap();
        assert_eq!(event, "success");

        let remaining = deps.store.get_pending_events("worker-1").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].event_type, "keep_me");
    }
}
