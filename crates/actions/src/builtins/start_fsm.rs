// SPDX-License-Identifier: MIT
//! `start_fsm`: spawn an independent child machine process. Children are
//! autonomous — there is no supervision tree, only events and the shared
//! store connect parent and child afterwards.

use async_trait::async_trait;
use statewire_config::ActionConfig;
use statewire_core::context::keys;
use statewire_core::{Clock, ExecutionContext};
use tokio::process::Command;

use crate::action::{require_str, str_or, Action};
use crate::deps::ActionDeps;
use crate::error::ActionError;

pub struct StartFsm;

#[async_trait]
impl<C: Clock> Action<C> for StartFsm {
    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &mut ExecutionContext,
        _deps: &ActionDeps<C>,
    ) -> Result<String, ActionError> {
        let yaml_path = require_str(config, "start_fsm", "yaml_path")?;
        let machine_name = require_str(config, "start_fsm", "machine_name")?;

        let context_vars = config
            .params
            .get("context_vars")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let mut initial_context = serde_json::Map::new();
        for entry in &context_vars {
            let Some(spec) = entry.as_str() else { continue };
            let (source, target) = match spec.split_once(" as ") {
                Some((s, t)) => (s.trim(), t.trim()),
                None => (spec.trim(), spec.trim()),
            };
            if let Some(value) = ctx.resolve_path(source) {
                initial_context.insert(target.to_string(), value.clone());
            }
        }

        let exe = std::env::current_exe().map_err(ActionError::Spawn)?;
        let mut command = Command::new(exe);
        command
            .arg("engine")
            .arg("run")
            .arg("--config")
            .arg(yaml_path)
            .arg("--machine-name")
            .arg(machine_name)
            .arg("--initial-context")
            .arg(serde_json::Value::Object(initial_context).to_string());

        if let Some(extra) = config.params.get("additional_args").and_then(|v| v.as_array()) {
            for arg in extra.iter().filter_map(|v| v.as_str()) {
                command.arg(arg);
            }
        }

        let child = command.kill_on_drop(false).spawn().map_err(ActionError::Spawn)?;

        if config.params.get("store_pid").and_then(|v| v.as_bool()).unwrap_or(false) {
            if let Some(pid) = child.id() {
                ctx.set(&format!("{}_pid", keys::CURRENT_JOB), serde_json::json!(pid));
            }
        }

        Ok(str_or(config, "success", "started").to_string())
    }
}
