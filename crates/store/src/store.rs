// SPDX-License-Identifier: MIT
//! The embedded SQL store (§4.1, C1): one file, one writer at a time, jobs
//! claimed with a single atomic statement so `get_next_job` can never hand
//! the same pending job to two machines (Testable Property 1).

use std::path::Path;
use std::str::FromStr;

use serde::de::Error as _;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use statewire_core::{EventId, Job, JobId, JobStatus, MachineEvent, MachineState, RealtimeFrame};

use crate::error::StoreError;
use crate::rows::{JobRow, MachineEventRow, MachineStateRow};
use crate::schema;

/// Number of rows kept in the `realtime_events` ring buffer (§10.5).
const REALTIME_RING_CAPACITY: i64 = 500;

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if absent) the sqlite file at `path` and apply any
    /// outstanding schema migrations.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));
        let pool = SqlitePoolOptions::new().max_connections(4).connect_with(options).await?;
        schema::apply(&pool).await?;
        Ok(Self { pool })
    }

    /// Open a private in-memory database, for tests that don't need a file
    /// on disk. A single connection is held open for the pool's lifetime so
    /// the in-memory schema survives across calls.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(StoreError::Database)?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Memory);
        let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;
        schema::apply(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn create_job(&self, job: &Job) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO jobs (id, job_type, status, priority, assigned_machine, data, source_job_id, created_at_ms, updated_at_ms)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(job.id.as_str())
        .bind(&job.job_type)
        .bind(job.status.to_string())
        .bind(job.priority)
        .bind(&job.assigned_machine)
        .bind(job.data.to_string())
        .bind(job.source_job_id.as_ref().map(JobId::as_str))
        .bind(job.created_at_ms as i64)
        .bind(job.updated_at_ms as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Atomically claim the oldest, highest-priority pending job matching
    /// `job_type` (any type, if `None`) and, only if `machine_type` is
    /// given, pre-routed to that machine type or unrouted. The claim and
    /// the status flip happen in one statement: two machines racing this
    /// call can never both receive the same job (Testable Property 1).
    pub async fn get_next_job(
        &self,
        job_type: Option<&str>,
        machine_type: Option<&str>,
        machine_name: &str,
        now_ms: u64,
    ) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(
            "UPDATE jobs SET status = 'processing', assigned_machine = ?, updated_at_ms = ?
             WHERE id = (
                 SELECT id FROM jobs
                 WHERE status = 'pending'
                   AND (?3 IS NULL OR job_type = ?3)
                   AND (?4 IS NULL OR assigned_machine IS NULL OR assigned_machine = ?4)
                 ORDER BY priority ASC, created_at_ms ASC
                 LIMIT 1
             )
             RETURNING id, job_type, status, priority, assigned_machine, data, source_job_id, created_at_ms, updated_at_ms",
        )
        .bind(machine_name)
        .bind(now_ms as i64)
        .bind(job_type)
        .bind(machine_type)
        .fetch_optional(&self.pool)
        .await?;
        row.map(JobRow::into_job).transpose()
    }

    /// Mark a job terminal and merge `result_data` into its `data` (§4.3
    /// `complete_job` contract). Returns the job as it stood after the merge.
    pub async fn complete_job(
        &self,
        job_id: &JobId,
        status: JobStatus,
        result_data: Option<Value>,
        now_ms: u64,
    ) -> Result<Job, StoreError> {
        let mut tx = self.pool.begin().await?;
        let row: JobRow = sqlx::query_as(
            "SELECT id, job_type, status, priority, assigned_machine, data, source_job_id, created_at_ms, updated_at_ms
             FROM jobs WHERE id = ?",
        )
        .bind(job_id.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::JobNotFound(job_id.to_string()))?;

        let mut job = row.into_job()?;
        job.merge_result_data(result_data);
        job.status = status;
        job.updated_at_ms = now_ms;

        sqlx::query("UPDATE jobs SET status = ?, data = ?, updated_at_ms = ? WHERE id = ?")
            .bind(job.status.to_string())
            .bind(job.data.to_string())
            .bind(job.updated_at_ms as i64)
            .bind(job_id.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(job)
    }

    /// All jobs, newest first — the CLI's `jobs list` surface (§6).
    pub async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let rows: Vec<JobRow> = sqlx::query_as(
            "SELECT id, job_type, status, priority, assigned_machine, data, source_job_id, created_at_ms, updated_at_ms
             FROM jobs ORDER BY created_at_ms DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(JobRow::into_job).collect()
    }

    /// Force a job's status without the `complete_job` result-data merge
    /// (§6 `jobs update-status`); used by the CLI for manual intervention.
    pub async fn update_job_status(&self, job_id: &JobId, status: JobStatus, now_ms: u64) -> Result<Job, StoreError> {
        let row: Option<JobRow> = sqlx::query_as(
            "UPDATE jobs SET status = ?, updated_at_ms = ? WHERE id = ?
             RETURNING id, job_type, status, priority, assigned_machine, data, source_job_id, created_at_ms, updated_at_ms",
        )
        .bind(status.to_string())
        .bind(now_ms as i64)
        .bind(job_id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| StoreError::JobNotFound(job_id.to_string()))?.into_job()
    }

    pub async fn delete_job(&self, job_id: &JobId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?").bind(job_id.as_str()).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::JobNotFound(job_id.to_string()));
        }
        Ok(())
    }

    pub async fn send_event(&self, event: &MachineEvent) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO machine_events (id, target_machine, source_machine, event_type, job_id, payload, created_at_ms, consumed_at_ms)
             VALUES (?, ?, ?, ?, ?, ?, ?, NULL)",
        )
        .bind(event.id.as_str())
        .bind(&event.target_machine)
        .bind(&event.source_machine)
        .bind(&event.event_type)
        .bind(event.job_id.as_ref().map(JobId::as_str))
        .bind(event.payload.to_string())
        .bind(event.created_at_ms as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Unconsumed events addressed to `target_machine`, oldest first — the
    /// durable mailbox a machine drains every tick (§4.4 step 2).
    pub async fn get_pending_events(&self, target_machine: &str) -> Result<Vec<MachineEvent>, StoreError> {
        let rows: Vec<MachineEventRow> = sqlx::query_as(
            "SELECT id, target_machine, source_machine, event_type, job_id, payload, created_at_ms, consumed_at_ms
             FROM machine_events
             WHERE target_machine = ? AND consumed_at_ms IS NULL
             ORDER BY created_at_ms ASC",
        )
        .bind(target_machine)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(MachineEventRow::into_event).collect()
    }

    /// Idempotent: consuming an already-consumed event is a no-op, so a
    /// duplicate datagram delivery can never double-consume (§4.1 note).
    pub async fn mark_consumed(&self, event_id: &EventId, consumed_at_ms: u64) -> Result<(), StoreError> {
        sqlx::query("UPDATE machine_events SET consumed_at_ms = ? WHERE id = ? AND consumed_at_ms IS NULL")
            .bind(consumed_at_ms as i64)
            .bind(event_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn upsert_machine_state(&self, state: &MachineState) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO machine_state (machine_name, config_type, current_state, pid, last_activity_ms, metadata)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(machine_name) DO UPDATE SET
                 config_type = excluded.config_type,
                 current_state = excluded.current_state,
                 pid = excluded.pid,
                 last_activity_ms = excluded.last_activity_ms,
                 metadata = excluded.metadata",
        )
        .bind(&state.machine_name)
        .bind(&state.config_type)
        .bind(&state.current_state)
        .bind(state.pid.map(|v| v as i64))
        .bind(state.last_activity_ms as i64)
        .bind(state.metadata.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_machine_state(&self, machine_name: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM machine_state WHERE machine_name = ?")
            .bind(machine_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_machine_state(&self, machine_name: &str) -> Result<Option<MachineState>, StoreError> {
        let row: Option<MachineStateRow> = sqlx::query_as(
            "SELECT machine_name, config_type, current_state, pid, last_activity_ms, metadata
             FROM machine_state WHERE machine_name = ?",
        )
        .bind(machine_name)
        .fetch_optional(&self.pool)
        .await?;
        row.map(MachineStateRow::into_state).transpose()
    }

    /// All live machines, for the diagram/status surfaces (C8) and the
    /// broadcaster's initial-snapshot frame.
    pub async fn list_machine_states(&self) -> Result<Vec<MachineState>, StoreError> {
        let rows: Vec<MachineStateRow> = sqlx::query_as(
            "SELECT machine_name, config_type, current_state, pid, last_activity_ms, metadata
             FROM machine_state ORDER BY machine_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(MachineStateRow::into_state).collect()
    }

    /// Append a realtime frame and trim the ring buffer back down to
    /// [`REALTIME_RING_CAPACITY`] rows (§10.5 bounded buffer).
    pub async fn record_realtime_event(&self, frame: &RealtimeFrame) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO realtime_events (machine_name, kind, payload, timestamp) VALUES (?, ?, ?, ?)")
            .bind(&frame.machine_name)
            .bind(frame.kind.to_string())
            .bind(frame.payload.to_string())
            .bind(frame.timestamp)
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "DELETE FROM realtime_events WHERE id NOT IN (SELECT id FROM realtime_events ORDER BY id DESC LIMIT ?)",
        )
        .bind(REALTIME_RING_CAPACITY)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent `limit` realtime frames, oldest first — replayed to a
    /// broadcaster client that just connected.
    pub async fn list_recent_realtime_events(&self, limit: i64) -> Result<Vec<RealtimeFrame>, StoreError> {
        let rows = sqlx::query(
            "SELECT machine_name, kind, payload, timestamp FROM realtime_events
             ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        let mut frames = Vec::with_capacity(rows.len());
        for row in rows {
            let kind: String = row.try_get("kind")?;
            let payload: String = row.try_get("payload")?;
            frames.push(RealtimeFrame {
                kind: parse_frame_kind(&kind)?,
                machine_name: row.try_get("machine_name")?,
                payload: serde_json::from_str(&payload)
                    .map_err(|source| StoreError::MalformedJson { column: "realtime_events.payload", source })?,
                timestamp: row.try_get("timestamp")?,
            });
        }
        frames.reverse();
        Ok(frames)
    }
}

fn parse_frame_kind(raw: &str) -> Result<statewire_core::FrameKind, StoreError> {
    use statewire_core::FrameKind::*;
    Ok(match raw {
        "state_change" => StateChange,
        "machine_event" => MachineEvent,
        "initial" => Initial,
        "ping" => Ping,
        "log" => Log,
        "shutdown" => Shutdown,
        other => {
            return Err(StoreError::MalformedJson {
                column: "realtime_events.kind",
                source: serde::de::Error::custom(format!("unknown frame kind {other:?}")),
            })
        }
    })
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
