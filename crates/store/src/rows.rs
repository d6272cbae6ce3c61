// SPDX-License-Identifier: MIT
//! Raw row shapes returned by sqlx, and their conversion into the domain
//! types from `statewire-core`. Kept separate from `store.rs` so the SQL
//! column layout doesn't leak into the rest of the crate.

use serde::de::Error as _;
use serde_json::Value;
use sqlx::FromRow;
use statewire_core::{Job, JobId, JobStatus, MachineEvent, MachineState};

use crate::error::StoreError;

#[derive(Debug, FromRow)]
pub struct JobRow {
    pub id: String,
    pub job_type: String,
    pub status: String,
    pub priority: i64,
    pub assigned_machine: Option<String>,
    pub data: String,
    pub source_job_id: Option<String>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl JobRow {
    pub fn into_job(self) -> Result<Job, StoreError> {
        let status = parse_status(&self.status)?;
        let data: Value = serde_json::from_str(&self.data)
            .map_err(|source| StoreError::MalformedJson { column: "jobs.data", source })?;
        Ok(Job {
            id: JobId::from_string(self.id),
            job_type: self.job_type,
            status,
            priority: self.priority,
            assigned_machine: self.assigned_machine,
            data,
            source_job_id: self.source_job_id.map(JobId::from_string),
            created_at_ms: self.created_at_ms as u64,
            updated_at_ms: self.updated_at_ms as u64,
        })
    }
}

fn parse_status(raw: &str) -> Result<JobStatus, StoreError> {
    match raw {
        "pending" => Ok(JobStatus::Pending),
        "processing" => Ok(JobStatus::Processing),
        "completed" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        other => Err(StoreError::MalformedJson {
            column: "jobs.status",
            source: serde::de::Error::custom(format!("unknown job status {other:?}")),
        }),
    }
}

#[derive(Debug, FromRow)]
pub struct MachineEventRow {
    pub id: String,
    pub target_machine: String,
    pub source_machine: String,
    pub event_type: String,
    pub job_id: Option<String>,
    pub payload: String,
    pub created_at_ms: i64,
    pub consumed_at_ms: Option<i64>,
}

impl MachineEventRow {
    pub fn into_event(self) -> Result<MachineEvent, StoreError> {
        let payload: Value = serde_json::from_str(&self.payload)
            .map_err(|source| StoreError::MalformedJson { column: "machine_events.payload", source })?;
        Ok(MachineEvent {
            id: statewire_core::EventId::from_string(self.id),
            target_machine: self.target_machine,
            source_machine: self.source_machine,
            event_type: self.event_type,
            job_id: self.job_id.map(JobId::from_string),
            payload,
            created_at_ms: self.created_at_ms as u64,
            consumed_at_ms: self.consumed_at_ms.map(|v| v as u64),
        })
    }
}

#[derive(Debug, FromRow)]
pub struct MachineStateRow {
    pub machine_name: String,
    pub config_type: String,
    pub current_state: String,
    pub pid: Option<i64>,
    pub last_activity_ms: i64,
    pub metadata: String,
}

impl MachineStateRow {
    pub fn into_state(self) -> Result<MachineState, StoreError> {
        let metadata: Value = serde_json::from_str(&self.metadata)
            .map_err(|source| StoreError::MalformedJson { column: "machine_state.metadata", source })?;
        Ok(MachineState {
            machine_name: self.machine_name,
            config_type: self.config_type,
            current_state: self.current_state,
            pid: self.pid.map(|v| v as u32),
            last_activity_ms: self.last_activity_ms as u64,
            metadata,
        })
    }
}
