// SPDX-License-Identifier: MIT
//! RealtimeFrame: the ephemeral broadcast record flowing to UI clients (§3 RealtimeFrame, §6).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind discriminant for a [`RealtimeFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    StateChange,
    MachineEvent,
    Initial,
    Ping,
    Log,
    Shutdown,
}

crate::simple_display! {
    FrameKind {
        StateChange => "state_change",
        MachineEvent => "machine_event",
        Initial => "initial",
        Ping => "ping",
        Log => "log",
        Shutdown => "shutdown",
    }
}

/// A frame flowing over the datagram fabric to the broadcaster, and from the
/// broadcaster to WebSocket clients (minus `initial`/`ping`, which the
/// broadcaster synthesizes itself).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeFrame {
    #[serde(rename = "type")]
    pub kind: FrameKind,
    pub machine_name: Option<String>,
    pub payload: Value,
    pub timestamp: f64,
}

impl RealtimeFrame {
    pub fn state_change(machine_name: &str, state: &str, timestamp: f64) -> Self {
        Self {
            kind: FrameKind::StateChange,
            machine_name: Some(machine_name.to_string()),
            payload: serde_json::json!({ "state": state }),
            timestamp,
        }
    }

    pub fn log(machine_name: &str, message: &str, level: &str, timestamp: f64) -> Self {
        Self {
            kind: FrameKind::Log,
            machine_name: Some(machine_name.to_string()),
            payload: serde_json::json!({ "message": message, "level": level }),
            timestamp,
        }
    }

    pub fn ping(timestamp: f64) -> Self {
        Self { kind: FrameKind::Ping, machine_name: None, payload: Value::Null, timestamp }
    }

    pub fn shutdown(machine_name: &str, timestamp: f64) -> Self {
        Self {
            kind: FrameKind::Shutdown,
            machine_name: Some(machine_name.to_string()),
            payload: Value::Null,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_change_frame_serializes_with_snake_case_type() {
        let frame = RealtimeFrame::state_change("worker-1", "processing", 100.0);
        let v = serde_json::to_value(&frame).unwrap();
        assert_eq!(v["type"], "state_change");
        assert_eq!(v["machine_name"], "worker-1");
        assert_eq!(v["payload"]["state"], "processing");
    }
}
