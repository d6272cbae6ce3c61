// SPDX-License-Identifier: MIT
//! `check_database_queue`: atomically claim the next matching pending job.

use async_trait::async_trait;
use statewire_config::ActionConfig;
use statewire_core::context::keys;
use statewire_core::{Clock, ExecutionContext};

use crate::action::{str_or, Action};
use crate::deps::ActionDeps;
use crate::error::ActionError;

pub struct CheckDatabaseQueue;

#[async_trait]
impl<C: Clock> Action<C> for CheckDatabaseQueue {
    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &mut ExecutionContext,
        deps: &ActionDeps<C>,
    ) -> Result<String, ActionError> {
        let job_type = config.params.get("job_type").and_then(|v| v.as_str());
        let machine_type = config.params.get("machine_type").and_then(|v| v.as_str());
        let machine_name = ctx
            .get(keys::MACHINE_NAME)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let claimed = deps
            .store
            .get_next_job(job_type, machine_type, &machine_name, deps.clock.epoch_ms())
            .await?;

        match claimed {
            Some(job) => {
                ctx.claim_job(&job);
                Ok(str_or(config, "success", "new_job").to_string())
            }
            None => Ok(str_or(config, "no_jobs", "no_jobs").to_string()),
        }
    }
}
