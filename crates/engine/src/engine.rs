// SPDX-License-Identifier: MIT
//! The per-machine tick loop (§4.4, C6): state -> actions -> event -> next
//! state, integrating the store, the action registry, and the interpolator.

use std::time::Duration;

use serde_json::{Map, Value};
use statewire_actions::{ActionDeps, ActionRegistry};
use statewire_config::{ActionConfig, MachineDefinition, Transition, TransitionEvent};
use statewire_core::interpolate::interpolate_value;
use statewire_core::{Clock, EventId, ExecutionContext, JobId, MachineEvent, MachineState, RealtimeFrame};
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;

/// Cooperative back-off between ticks when no transition fires (§4.4 step 3).
const TICK_BACKOFF: Duration = Duration::from_millis(100);

pub struct Engine<C: Clock> {
    definition: MachineDefinition,
    machine_name: String,
    registry: ActionRegistry<C>,
    deps: ActionDeps<C>,
    ctx: ExecutionContext,
    current_state: String,
    state_entered_at_ms: u64,
}

impl<C: Clock> Engine<C> {
    pub fn new(
        definition: MachineDefinition,
        machine_name: String,
        registry: ActionRegistry<C>,
        deps: ActionDeps<C>,
        initial_context: Map<String, Value>,
    ) -> Result<Self, EngineError> {
        if !definition.states.iter().any(|s| s == &definition.initial_state) {
            return Err(EngineError::UnknownInitialState(definition.initial_state.clone()));
        }
        let ctx = ExecutionContext::new(&machine_name).with_initial(initial_context);
        let state_entered_at_ms = deps.clock.epoch_ms();
        Ok(Self {
            current_state: definition.initial_state.clone(),
            state_entered_at_ms,
            definition,
            machine_name,
            registry,
            deps,
            ctx,
        })
    }

    pub fn current_state(&self) -> &str {
        &self.current_state
    }

    /// Drive the machine until `shutdown` is cancelled. Binds an inbound
    /// datagram relay alongside the tick loop; both stop together.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<(), EngineError> {
        self.publish_state(true).await?;
        let inbound = self.spawn_inbound_relay(shutdown.clone());

        while !shutdown.is_cancelled() {
            let fired = self.tick().await?;
            if !fired {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(TICK_BACKOFF) => {}
                }
            }
        }

        inbound.abort();
        self.deps.store.delete_machine_state(&self.machine_name).await?;
        let frame = RealtimeFrame::shutdown(&self.machine_name, self.deps.clock.epoch_secs_f64());
        if let Err(err) = self.deps.outbound_realtime.send_to(&self.deps.broadcaster_socket_path(), &frame).await {
            tracing::debug!(error = %err, "shutdown frame not delivered");
        }
        Ok(())
    }

    /// One tick (§4.4): evaluate candidates in order, running each
    /// transition's actions until one returns the matching event. Returns
    /// whether a transition fired.
    pub async fn tick(&mut self) -> Result<bool, EngineError> {
        let candidates: Vec<Transition> =
            order_candidates(self.definition.candidates_for(&self.current_state)).into_iter().cloned().collect();

        for transition in &candidates {
            let fired = match &transition.event {
                TransitionEvent::Timeout(secs) => self.try_fire_timeout(transition, *secs).await?,
                TransitionEvent::Named(expected) => self.try_fire_named(transition, expected).await?,
            };
            if fired {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn try_fire_timeout(&mut self, transition: &Transition, secs: u64) -> Result<bool, EngineError> {
        let resident_ms = self.deps.clock.epoch_ms().saturating_sub(self.state_entered_at_ms);
        if resident_ms < secs.saturating_mul(1000) {
            return Ok(false);
        }
        for action_cfg in &transition.actions {
            if let Err(err) = self.run_action(action_cfg).await {
                tracing::warn!(machine = %self.machine_name, error = %err, "timeout transition action failed");
                self.ctx.set_last_error(&err.to_string(), None);
            }
        }
        self.fire(transition).await?;
        Ok(true)
    }

    async fn try_fire_named(&mut self, transition: &Transition, expected: &str) -> Result<bool, EngineError> {
        for action_cfg in &transition.actions {
            let event_name = match self.run_action(action_cfg).await {
                Ok(name) => name,
                Err(err) => {
                    tracing::warn!(machine = %self.machine_name, action = %action_cfg.action_type, error = %err, "action failed, treated as error event");
                    self.ctx.set_last_error(&err.to_string(), None);
                    "error".to_string()
                }
            };
            if event_name == expected {
                self.fire(transition).await?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn run_action(&mut self, action_cfg: &ActionConfig) -> Result<String, statewire_actions::ActionError> {
        let action = self
            .registry
            .get(&action_cfg.action_type)
            .cloned()
            .ok_or_else(|| statewire_actions::ActionError::UnknownType(action_cfg.action_type.clone()))?;

        let (rendered, warnings) =
            interpolate_value(&Value::Object(action_cfg.params.clone()), &self.ctx.as_value());
        for warning in warnings {
            tracing::warn!(path = %warning.path, "unresolved interpolation placeholder");
        }
        let interpolated = ActionConfig {
            action_type: action_cfg.action_type.clone(),
            success: action_cfg.success.clone(),
            error: action_cfg.error.clone(),
            params: rendered.as_object().cloned().unwrap_or_default(),
        };

        action.execute(&interpolated, &mut self.ctx, &self.deps).await
    }

    async fn fire(&mut self, transition: &Transition) -> Result<(), EngineError> {
        self.current_state = transition.to.clone();
        self.state_entered_at_ms = self.deps.clock.epoch_ms();
        self.publish_state(false).await
    }

    /// Store.upsert_machine_state is the primary mutation; the realtime ring
    /// row and the live datagram are best-effort (§4.1 "must not fail the
    /// primary mutation").
    async fn publish_state(&self, initial: bool) -> Result<(), EngineError> {
        let now_ms = self.deps.clock.epoch_ms();
        let state = MachineState {
            machine_name: self.machine_name.clone(),
            config_type: self.definition.name.clone(),
            current_state: self.current_state.clone(),
            pid: Some(std::process::id()),
            last_activity_ms: now_ms,
            metadata: Value::Object(Map::new()),
        };
        self.deps.store.upsert_machine_state(&state).await?;

        let frame = if initial {
            RealtimeFrame {
                kind: statewire_core::FrameKind::Initial,
                machine_name: Some(self.machine_name.clone()),
                payload: serde_json::json!({ "state": self.current_state }),
                timestamp: self.deps.clock.epoch_secs_f64(),
            }
        } else {
            RealtimeFrame::state_change(&self.machine_name, &self.current_state, self.deps.clock.epoch_secs_f64())
        };
        if let Err(err) = self.deps.store.record_realtime_event(&frame).await {
            tracing::debug!(error = %err, "failed to persist realtime frame for late joiners");
        }
        if let Err(err) = self.deps.outbound_realtime.send_to(&self.deps.broadcaster_socket_path(), &frame).await {
            tracing::debug!(error = %err, "broadcaster datagram send failed");
        }
        Ok(())
    }

    /// Binds this machine's own receive socket and relays arriving frames
    /// into the durable mailbox (§4.4 "Inbound event delivery"). Best effort:
    /// the persistent mailbox, not this relay, is the source of truth.
    fn spawn_inbound_relay(&self, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        let store = self.deps.store.clone();
        let socket_path = self.deps.machine_socket_path(&self.machine_name);
        let machine_name = self.machine_name.clone();
        let clock = self.deps.clock.clone();

        tokio::spawn(async move {
            let channel = match statewire_bus::DatagramChannel::<statewire_core::EventFrame>::bind(&socket_path) {
                Ok(channel) => channel,
                Err(err) => {
                    tracing::error!(error = %err, path = %socket_path.display(), "failed to bind inbound event socket");
                    return;
                }
            };
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    received = channel.recv() => {
                        match received {
                            Ok(frame) => {
                                let event = MachineEvent {
                                    id: EventId::new(),
                                    target_machine: machine_name.clone(),
                                    source_machine: frame.source,
                                    event_type: frame.event_type,
                                    job_id: frame.job_id.map(JobId::from_string),
                                    payload: frame.payload,
                                    created_at_ms: clock.epoch_ms(),
                                    consumed_at_ms: None,
                                };
                                if let Err(err) = store.send_event(&event).await {
                                    tracing::warn!(error = %err, "failed to append relayed event to mailbox");
                                }
                            }
                            Err(err) => tracing::debug!(error = %err, "inbound datagram decode failed"),
                        }
                    }
                }
            }
        })
    }
}

/// Reorders a state's candidates so `timeout(N)` transitions are evaluated
/// last, after every plain named-event transition (including wildcards) —
/// `candidates_for` already puts wildcard sources after declared ones, this
/// adds the same treatment for the time-based form (§4.4 "evaluated after
/// declared sources each tick").
fn order_candidates<'a>(candidates: Vec<&'a Transition>) -> Vec<&'a Transition> {
    let (named, timeout): (Vec<_>, Vec<_>) =
        candidates.into_iter().partition(|t| matches!(t.event, TransitionEvent::Named(_)));
    let mut ordered = named;
    ordered.extend(timeout);
    ordered
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
