// SPDX-License-Identifier: MIT
//! `send_event`: write an event into the target's durable mailbox and, best
//! effort, nudge it immediately over the datagram fabric.

use async_trait::async_trait;
use serde_json::Value;
use statewire_config::ActionConfig;
use statewire_core::context::keys;
use statewire_core::{Clock, EventFrame, EventId, ExecutionContext, MachineEvent};

use crate::action::{require_str, str_or, Action};
use crate::deps::ActionDeps;
use crate::error::ActionError;

pub struct SendEvent;

#[async_trait]
impl<C: Clock> Action<C> for SendEvent {
    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &mut ExecutionContext,
        deps: &ActionDeps<C>,
    ) -> Result<String, ActionError> {
        let target_machine = require_str(config, "send_event", "target_machine")?.to_string();
        let event_type = require_str(config, "send_event", "event_type")?.to_string();
        let payload = config.params.get("payload").cloned().unwrap_or(Value::Null);
        let source_machine =
            ctx.get(keys::MACHINE_NAME).and_then(|v| v.as_str()).unwrap_or_default().to_string();

        let event = MachineEvent {
            id: EventId::new(),
            target_machine: target_machine.clone(),
            source_machine,
            event_type,
            job_id: ctx.get(keys::JOB_ID).and_then(|v| v.as_str()).map(Into::into),
            payload,
            created_at_ms: deps.clock.epoch_ms(),
            consumed_at_ms: None,
        };
        deps.store.send_event(&event).await?;

        let target_path = deps.machine_socket_path(&target_machine);
        let frame = EventFrame::from(&event);
        if let Err(err) = deps.outbound_events.send_to(&target_path, &frame).await {
            tracing::debug!(target = %target_machine, error = %err, "datagram nudge failed, mailbox row still delivered");
        }

        Ok(str_or(config, "success", "event_sent").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statewire_core::FakeClock;
    use statewire_store::Store;
    use std::sync::Arc;

    async fn deps() -> ActionDeps<FakeClock> {
        let store = Arc::new(Store::open_in_memory().await.unwrap());
        let dir = tempfile::tempdir().unwrap();
        ActionDeps {
            store,
            outbound_events: Arc::new(statewire_bus::DatagramChannel::unbound().unwrap()),
            outbound_realtime: Arc::new(statewire_bus::DatagramChannel::unbound().unwrap()),
            socket_dir: dir.into_path(),
            clock: FakeClock::new(1_000),
        }
    }

    #[tokio::test]
    async fn writes_mailbox_row_even_when_datagram_target_is_absent() {
        let deps = deps().await;
        let mut ctx = ExecutionContext::new("controller");
        let cfg = ActionConfig {
            action_type: "send_event".to_string(),
            success: None,
            error: None,
            params: serde_json::json!({
                "target_machine": "worker-1",
                "event_type": "job_done",
                "payload": {"k": "v"},
            })
            .as_object()
            .cloned()
            .unwrap(),
        };
        let event = SendEvent.execute(&cfg, &mut ctx, &deps).await.unwrap();
        assert_eq!(event, "event_sent");

        let pending = deps.store.get_pending_events("worker-1").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].event_type, "job_done");
        assert_eq!(pending[0].source_machine, "controller");
    }
}
