// SPDX-License-Identifier: MIT
//! `statewire jobs ...` (§6 "Job admin").

use statewire_core::{Clock, Job, JobId, JobStatus, SystemClock};
use statewire_store::Store;

use crate::cli::{JobsAddArgs, JobsDeleteArgs, JobsListArgs, JobsUpdateStatusArgs};
use crate::exit_error::ExitError;
use crate::output;

async fn open_store() -> Result<Store, ExitError> {
    let path = crate::env::store_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    Store::open(&path).await.map_err(|err| ExitError::unhandled(err.to_string()))
}

pub async fn list(args: JobsListArgs) -> Result<(), ExitError> {
    let store = open_store().await?;
    let jobs = store.list_jobs().await.map_err(|err| ExitError::unhandled(err.to_string()))?;
    output::handle_list(output::resolve(args.output, args.json), &jobs, |jobs| {
        for job in jobs {
            println!(
                "{}\t{}\t{}\tpriority={}\tassigned={}",
                job.id.as_str(),
                job.job_type,
                job.status,
                job.priority,
                job.assigned_machine.as_deref().unwrap_or("-"),
            );
        }
    });
    Ok(())
}

pub async fn add(args: JobsAddArgs) -> Result<(), ExitError> {
    let data = match args.data {
        Some(raw) => {
            serde_json::from_str(&raw).map_err(|err| ExitError::usage(format!("--data is not valid JSON: {err}")))?
        }
        None => serde_json::json!({}),
    };
    let format = output::resolve(args.output, args.json);
    let store = open_store().await?;
    let now = SystemClock.epoch_ms();
    let job = Job {
        id: JobId::new(),
        job_type: args.job_type,
        status: JobStatus::Pending,
        priority: args.priority,
        assigned_machine: None,
        data,
        source_job_id: None,
        created_at_ms: now,
        updated_at_ms: now,
    };
    store.create_job(&job).await.map_err(|err| ExitError::unhandled(err.to_string()))?;
    output::format_or_json(format, &job, || println!("{}", job.id.as_str()));
    Ok(())
}

pub async fn update_status(args: JobsUpdateStatusArgs) -> Result<(), ExitError> {
    let status = parse_status(&args.status)?;
    let format = output::resolve(args.output, args.json);
    let store = open_store().await?;
    let now = SystemClock.epoch_ms();
    let job_id = JobId::from_string(args.job_id);
    let job = store.update_job_status(&job_id, status, now).await.map_err(|err| ExitError::unhandled(err.to_string()))?;
    output::format_or_json(format, &job, || println!("{} -> {}", job.id.as_str(), job.status));
    Ok(())
}

pub async fn delete(args: JobsDeleteArgs) -> Result<(), ExitError> {
    let store = open_store().await?;
    let job_id = JobId::from_string(args.job_id);
    store.delete_job(&job_id).await.map_err(|err| ExitError::unhandled(err.to_string()))?;
    Ok(())
}

fn parse_status(raw: &str) -> Result<JobStatus, ExitError> {
    match raw {
        "pending" => Ok(JobStatus::Pending),
        "processing" => Ok(JobStatus::Processing),
        "completed" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        other => Err(ExitError::usage(format!("unknown status {other:?} (expected pending|processing|completed|failed)"))),
    }
}
