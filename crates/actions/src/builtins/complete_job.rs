// SPDX-License-Identifier: MIT
//! `complete_job`: flip a job to `completed`/`failed` and merge `result_data`
//! into its `data` column (§4.1 `complete_job` contract).

use async_trait::async_trait;
use statewire_config::ActionConfig;
use statewire_core::{Clock, ExecutionContext, JobId, JobStatus};

use crate::action::{require_str, str_or, Action};
use crate::deps::ActionDeps;
use crate::error::ActionError;

pub struct CompleteJob;

#[async_trait]
impl<C: Clock> Action<C> for CompleteJob {
    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &mut ExecutionContext,
        deps: &ActionDeps<C>,
    ) -> Result<String, ActionError> {
        let job_id = require_str(config, "complete_job", "job_id")?;
        let status_str = str_or(config, "status", "completed");
        let status = match status_str {
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            other => {
                return Err(ActionError::InvalidParam {
                    action: "complete_job",
                    param: "status",
                    reason: format!("expected completed|failed, got {other:?}"),
                })
            }
        };
        let result_data = config.params.get("result_data").cloned();

        let job = deps
            .store
            .complete_job(&JobId::from_string(job_id), status, result_data, deps.clock.epoch_ms())
            .await?;
        ctx.set("current_job", serde_json::to_value(&job).unwrap_or(serde_json::Value::Null));

        Ok(str_or(config, "success", "completed").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statewire_core::{FakeClock, Job};
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
    async fn marks_job_completed_and_merges_result_data() {
        let deps = deps().await;
        let job = Job {
            id: JobId::from_string("job_1"),
            job_type: "report".into(),
            status: statewire_core::JobStatus::Processing,
            priority: 100,
            assigned_machine: Some("worker-1".into()),
            data: serde_json::json!({"a": 1}),
            source_job_id: None,
            created_at_ms: 0,
            updated_at_ms: 0,
        };
        deps.store.create_job(&job).await.unwrap();

        let mut ctx = ExecutionContext::new("worker-1");
        let cfg = ActionConfig {
            action_type: "complete_job".to_string(),
            success: None,
            error: None,
            params: serde_json::json!({
                "job_id": "job_1",
                "status": "completed",
                "result_data": {"b": 2},
            })
            .as_object()
            .cloned()
            .unwrap(),
        };
        let event = CompleteJob.execute(&cfg, &mut ctx, &deps).await.unwrap();
        assert_eq!(event, "completed");
        assert_eq!(
            ctx.get("current_job").unwrap().get("data").unwrap(),
            &serde_json::json!({"a": 1, "b": 2})
        );
    }

    #[tokio::test]
    async fn rejects_unknown_status() {
        let deps = deps().await;
        let mut ctx = ExecutionContext::new("worker-1");
        let cfg = ActionConfig {
            action_type: "complete_job".to_string(),
            success: None,
            error: None,
            params: serde_json::json!({"job_id": "job_1", "status": "done"})
                .as_object()
                .cloned()
                .unwrap(),
        };
        assert!(CompleteJob.execute(&cfg, &mut ctx, &deps).await.is_err());
    }
}
