// SPDX-License-Identifier: MIT
//! `check_events`: poll the mailbox for the first unconsumed event matching
//! one of `event_types`, optionally consuming it.

use async_trait::async_trait;
use serde_json::Value;
use statewire_config::ActionConfig;
use statewire_core::context::keys;
use statewire_core::{Clock, ExecutionContext};

use crate::action::{require_str_list, Action};
use crate::deps::ActionDeps;
use crate::error::ActionError;

pub struct CheckEvents;

#[async_trait]
impl<C: Clock> Action<C> for CheckEvents {
    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &mut ExecutionContext,
        deps: &ActionDeps<C>,
    ) -> Result<String, ActionError> {
        let event_types = require_str_list(config, "check_events", "event_types")?;
        let consume = config.params.get("consume").and_then(|v| v.as_bool()).unwrap_or(false);
        let machine_name =
            ctx.get(keys::MACHINE_NAME).and_then(|v| v.as_str()).unwrap_or_default().to_string();

        let pending = deps.store.get_pending_events(&machine_name).await?;
        let Some(hit) = pending.into_iter().find(|e| event_types.iter().any(|t| t == &e.event_type))
        else {
            return Ok(config
                .params
                .get("no_events")
                .and_then(|v| v.as_str())
                .unwrap_or("no_events")
                .to_string());
        };

        let payload = match &hit.payload {
            Value::String(s) => serde_json::from_str(s).unwrap_or_else(|_| hit.payload.clone()),
            other => other.clone(),
        };
        ctx.set_event_data(payload);

        if consume {
            deps.store.mark_consumed(&hit.id, deps.clock.epoch_ms()).await?;
        }

        Ok(hit.event_type)
    }
}
