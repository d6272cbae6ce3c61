use super::*;
use statewire_core::{EventId, JobId, MachineEvent};
use std::sync::Arc;

fn sample_job(job_type: &str, priority: i64, now_ms: u64) -> Job {
    Job {
        id: JobId::new(),
        job_type: job_type.to_string(),
        status: JobStatus::Pending,
        priority,
        assigned_machine: None,
        data: serde_json::json!({"n": 1}),
        source_job_id: None,
        created_at_ms: now_ms,
        updated_at_ms: now_ms,
    }
}

#[tokio::test]
async fn create_and_claim_round_trip() {
    let store = Store::open_in_memory().await.unwrap();
    let job = sample_job("build", 10, 1_000);
    store.create_job(&job).await.unwrap();

    let claimed = store.get_next_job(Some("build"), None, "worker-1", 1_001).await.unwrap().unwrap();
    assert_eq!(claimed.id, job.id);
    assert_eq!(claimed.status, JobStatus::Processing);
    assert_eq!(claimed.assigned_machine.as_deref(), Some("worker-1"));

    assert!(store.get_next_job(Some("build"), None, "worker-2", 1_002).await.unwrap().is_none());
}

#[tokio::test]
async fn claim_honors_priority_then_age() {
    let store = Store::open_in_memory().await.unwrap();
    let low = sample_job("t", 5, 1_000);
    let high = sample_job("t", 1, 1_001);
    store.create_job(&low).await.unwrap();
    store.create_job(&high).await.unwrap();

    let first = store.get_next_job(Some("t"), None, "w", 2_000).await.unwrap().unwrap();
    assert_eq!(first.id, high.id, "lower priority value claims first");
}

#[tokio::test]
async fn claim_filters_by_job_type() {
    let store = Store::open_in_memory().await.unwrap();
    store.create_job(&sample_job("other", 1, 1_000)).await.unwrap();
    assert!(store.get_next_job(Some("build"), None, "w", 1_000).await.unwrap().is_none());
}

#[tokio::test]
async fn at_most_one_claim_under_concurrency() {
    // Testable Property 1: two machines racing `get_next_job` never both
    // receive the same pending job.
    let store = Arc::new(Store::open_in_memory().await.unwrap());
    store.create_job(&sample_job("t", 1, 1_000)).await.unwrap();

    let a = {
        let store = store.clone();
        tokio::spawn(async move { store.get_next_job(Some("t"), None, "a", 1_001).await.unwrap() })
    };
    let b = {
        let store = store.clone();
        tokio::spawn(async move { store.get_next_job(Some("t"), None, "b", 1_001).await.unwrap() })
    };
    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    let winners = [a, b].into_iter().flatten().count();
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn complete_job_merges_result_data_and_sets_status() {
    let store = Store::open_in_memory().await.unwrap();
    let job = sample_job("t", 1, 1_000);
    store.create_job(&job).await.unwrap();
    store.get_next_job(Some("t"), None, "w", 1_001).await.unwrap();

    let done = store
        .complete_job(&job.id, JobStatus::Completed, Some(serde_json::json!({"out": 42})), 1_002)
        .await
        .unwrap();
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.data["n"], 1);
    assert_eq!(done.data["out"], 42);
}

#[tokio::test]
async fn complete_job_missing_returns_not_found() {
    let store = Store::open_in_memory().await.unwrap();
    let err = store.complete_job(&JobId::new(), JobStatus::Failed, None, 1_000).await.unwrap_err();
    assert!(matches!(err, StoreError::JobNotFound(_)));
}

#[tokio::test]
async fn mailbox_delivers_unconsumed_in_order_and_is_idempotent() {
    let store = Store::open_in_memory().await.unwrap();
    for i in 0..3 {
        let ev = MachineEvent {
            id: EventId::new(),
            target_machine: "b".to_string(),
            source_machine: "a".to_string(),
            event_type: "tick".to_string(),
            job_id: None,
            payload: serde_json::json!({ "i": i }),
            created_at_ms: 1_000 + i,
            consumed_at_ms: None,
        };
        store.send_event(&ev).await.unwrap();
    }

    let pending = store.get_pending_events("b").await.unwrap();
    assert_eq!(pending.len(), 3);
    assert_eq!(pending[0].payload["i"], 0);

    store.mark_consumed(&pending[0].id, 2_000).await.unwrap();
    store.mark_consumed(&pending[0].id, 2_001).await.unwrap(); // idempotent

    let remaining = store.get_pending_events("b").await.unwrap();
    assert_eq!(remaining.len(), 2);
}

#[tokio::test]
async fn machine_state_upsert_and_delete() {
    let store = Store::open_in_memory().await.unwrap();
    let state = MachineState {
        machine_name: "worker-1".to_string(),
        config_type: "worker".to_string(),
        current_state: "waiting".to_string(),
        pid: Some(123),
        last_activity_ms: 1_000,
        metadata: serde_json::json!({}),
    };
    store.upsert_machine_state(&state).await.unwrap();
    let fetched = store.get_machine_state("worker-1").await.unwrap().unwrap();
    assert_eq!(fetched.current_state, "waiting");

    let mut moved = state.clone();
    moved.current_state = "processing".to_string();
    store.upsert_machine_state(&moved).await.unwrap();
    let fetched = store.get_machine_state("worker-1").await.unwrap().unwrap();
    assert_eq!(fetched.current_state, "processing");

    store.delete_machine_state("worker-1").await.unwrap();
    assert!(store.get_machine_state("worker-1").await.unwrap().is_none());
}

#[tokio::test]
async fn list_machine_states_returns_all_live_machines() {
    let store = Store::open_in_memory().await.unwrap();
    for name in ["a", "b"] {
        store
            .upsert_machine_state(&MachineState {
                machine_name: name.to_string(),
                config_type: "worker".to_string(),
                current_state: "waiting".to_string(),
                pid: None,
                last_activity_ms: 1_000,
                metadata: serde_json::json!({}),
            })
            .await
            .unwrap();
    }
    assert_eq!(store.list_machine_states().await.unwrap().len(), 2);
}

#[tokio::test]
async fn list_jobs_returns_newest_first() {
    let store = Store::open_in_memory().await.unwrap();
    store.create_job(&sample_job("a", 1, 1_000)).await.unwrap();
    store.create_job(&sample_job("b", 1, 2_000)).await.unwrap();

    let jobs = store.list_jobs().await.unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].job_type, "b");
}

#[tokio::test]
async fn update_job_status_sets_status_without_touching_data() {
    let store = Store::open_in_memory().await.unwrap();
    let job = sample_job("a", 1, 1_000);
    store.create_job(&job).await.unwrap();

    let updated = store.update_job_status(&job.id, JobStatus::Failed, 1_500).await.unwrap();
    assert_eq!(updated.status, JobStatus::Failed);
    assert_eq!(updated.data["n"], 1);
}

#[tokio::test]
async fn update_job_status_missing_returns_not_found() {
    let store = Store::open_in_memory().await.unwrap();
    let err = store.update_job_status(&JobId::new(), JobStatus::Failed, 1_000).await.unwrap_err();
    assert!(matches!(err, StoreError::JobNotFound(_)));
}

#[tokio::test]
async fn delete_job_removes_the_row() {
    let store = Store::open_in_memory().await.unwrap();
    let job = sample_job("a", 1, 1_000);
    store.create_job(&job).await.unwrap();
    store.delete_job(&job.id).await.unwrap();
    assert!(store.list_jobs().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_job_missing_returns_not_found() {
    let store = Store::open_in_memory().await.unwrap();
    let err = store.delete_job(&JobId::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::JobNotFound(_)));
}

#[tokio::test]
async fn realtime_ring_buffer_is_bounded_and_keeps_newest() {
    let store = Store::open_in_memory().await.unwrap();
    for i in 0..(super::REALTIME_RING_CAPACITY + 10) {
        let frame = RealtimeFrame::state_change("worker-1", "processing", i as f64);
        store.record_realtime_event(&frame).await.unwrap();
    }
    let recent = store.list_recent_realtime_events(super::REALTIME_RING_CAPACITY + 10).await.unwrap();
    assert_eq!(recent.len() as i64, super::REALTIME_RING_CAPACITY);
    assert_eq!(recent.last().unwrap().timestamp, (super::REALTIME_RING_CAPACITY + 9) as f64);
}
