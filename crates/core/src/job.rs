// SPDX-License-Identifier: MIT
//! Job: the unit of work claimed and executed by a machine (§3 Job).

use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique identifier for a job row.
    pub struct JobId("job_");
}

/// Lifecycle status of a [`Job`]. Once `Completed` or `Failed` a job is never
/// re-dispatched — see `get_next_job` in the store contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Processing => "processing",
        Completed => "completed",
        Failed => "failed",
    }
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// A unit of work. See §3 "Job" for field invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(rename = "type")]
    pub job_type: String,
    pub status: JobStatus,
    /// Lower sorts first.
    pub priority: i64,
    pub assigned_machine: Option<String>,
    pub data: Value,
    pub source_job_id: Option<JobId>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Job {
    /// Merge `result_data` object keys into `data`, as `complete_job` does.
    pub fn merge_result_data(&mut self, result_data: Option<Value>) {
        let Some(Value::Object(incoming)) = result_data else { return };
        if !self.data.is_object() {
            self.data = Value::Object(Default::default());
        }
        let Value::Object(existing) = &mut self.data else { unreachable!() };
        for (k, v) in incoming {
            existing.insert(k, v);
        }
    }

    /// Top-level keys of `data`, for the "flatten current_job.data into ctx" rule.
    pub fn data_as_flat_pairs(&self) -> Vec<(String, Value)> {
        match &self.data {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => Vec::new(),
        }
    }
}
