// SPDX-License-Identifier: MIT
//! MachineEvent: a one-shot message queued for a named target machine (§3 MachineEvent).

use crate::job::JobId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique identifier for a mailbox row.
    pub struct EventId("evt_");
}

/// A message addressed to one machine, delivered at-most-once via consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineEvent {
    pub id: EventId,
    pub target_machine: String,
    pub source_machine: String,
    pub event_type: String,
    pub job_id: Option<JobId>,
    pub payload: Value,
    pub created_at_ms: u64,
    pub consumed_at_ms: Option<u64>,
}

impl MachineEvent {
    pub fn is_consumed(&self) -> bool {
        self.consumed_at_ms.is_some()
    }
}

/// Wire form of an inter-machine event frame sent on a per-target socket (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventFrame {
    #[serde(rename = "type")]
    pub event_type: String,
    pub source: String,
    pub job_id: Option<String>,
    pub payload: Value,
}

impl From<&MachineEvent> for EventFrame {
    fn from(ev: &MachineEvent) -> Self {
        Self {
            event_type: ev.event_type.clone(),
            source: ev.source_machine.clone(),
            job_id: ev.job_id.as_ref().map(|j| j.to_string()),
            payload: ev.payload.clone(),
        }
    }
}
