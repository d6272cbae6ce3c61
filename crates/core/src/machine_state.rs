// SPDX-License-Identifier: MIT
//! MachineState: one row per live machine (§3 MachineState).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineState {
    pub machine_name: String,
    pub config_type: String,
    pub current_state: String,
    pub pid: Option<u32>,
    pub last_activity_ms: u64,
    pub metadata: Value,
}
