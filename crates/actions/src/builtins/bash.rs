// SPDX-License-Identifier: MIT
//! `bash`: spawn a subprocess through `bash -c`, capture stdout/stderr,
//! enforce a timeout with a graceful-then-forced kill so a runaway command
//! never leaves a zombie behind (Testable Property 5).

use async_trait::async_trait;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use statewire_config::ActionConfig;
use statewire_core::{Clock, ExecutionContext};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::action::{require_str, str_or, Action};
use crate::deps::ActionDeps;
use crate::error::ActionError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Grace period between SIGTERM and SIGKILL once a command overruns its timeout.
const KILL_GRACE: Duration = Duration::from_secs(5);

pub struct Bash;

#[async_trait]
impl<C: Clock> Action<C> for Bash {
    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &mut ExecutionContext,
        _deps: &ActionDeps<C>,
    ) -> Result<String, ActionError> {
        let command = require_str(config, "bash", "command")?.to_string();
        let timeout_secs =
            config.params.get("timeout").and_then(|v| v.as_u64()).unwrap_or(DEFAULT_TIMEOUT_SECS);

        let mut child = Command::new("bash")
            .arg("-c")
            .arg(&command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ActionError::Spawn)?;

        let pid = child.id();
        let mut stdout_pipe = child.stdout.take().expect("piped stdout");
        let mut stderr_pipe = child.stderr.take().expect("piped stderr");
        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stdout_pipe.read_to_end(&mut buf).await;
            buf
        });
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr_pipe.read_to_end(&mut buf).await;
            buf
        });

        let status = match tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait()).await {
            Ok(result) => result.map_err(ActionError::Spawn)?,
            Err(_elapsed) => {
                terminate_then_kill(&mut child, pid).await;
                ctx.set_last_error(&format!("command timed out after {timeout_secs}s"), Some(&command));
                return Ok(str_or(config, "error", "error").to_string());
            }
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        if status.success() {
            let text = String::from_utf8_lossy(&stdout).trim().to_string();
            if !text.is_empty() {
                ctx.set("bash_stdout", serde_json::Value::String(text));
            }
            Ok(str_or(config, "success", "completed").to_string())
        } else {
            let text = String::from_utf8_lossy(&stderr).trim().to_string();
            ctx.set_last_error(&text, Some(&command));
            Ok(str_or(config, "error", "error").to_string())
        }
    }
}

/// SIGTERM, wait up to [`KILL_GRACE`], then SIGKILL if the process is still
/// alive (§5 "prevent zombies"). `kill_on_drop` on the [`Command`] is the
/// final backstop if even the forced kill's wait is interrupted.
async fn terminate_then_kill(child: &mut tokio::process::Child, pid: Option<u32>) {
    if let Some(pid) = pid {
        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
    }
    if tokio::time::timeout(KILL_GRACE, child.wait()).await.is_err() {
        let _ = child.kill().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statewire_core::FakeClock;
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

    fn config(params: serde_json::Value) -> ActionConfig {
        ActionConfig {
            action_type: "bash".to_string(),
            success: None,
            error: None,
            params: params.as_object().cloned().unwrap_or_default(),
        }
    }

    #[tokio::test]
    async fn successful_command_captures_stdout() {
        let deps = deps().await;
        let mut ctx = ExecutionContext::new("m");
        let cfg = config(serde_json::json!({"command": "echo hello"}));
        let event = Bash.execute(&cfg, &mut ctx, &deps).await.unwrap();
        assert_eq!(event, "completed");
        assert_eq!(ctx.get("bash_stdout"), Some(&serde_json::json!("hello")));
    }

    #[tokio::test]
    async fn nonzero_exit_sets_last_error_and_returns_error_event() {
        let deps = deps().await;
        let mut ctx = ExecutionContext::new("m");
        let cfg = config(serde_json::json!({"command": "exit 1", "error": "bash_failed"}));
        let event = Bash.execute(&cfg, &mut ctx, &deps).await.unwrap();
        assert_eq!(event, "bash_failed");
        assert!(ctx.get("last_error").is_some());
    }

    #[tokio::test]
    async fn timeout_is_enforced_and_process_is_killed() {
        let deps = deps().await;
        let mut ctx = ExecutionContext::new("m");
        let cfg = config(serde_json::json!({"command": "trap '' TERM; sleep 30", "timeout": 1}));
        let started = std::time::Instant::now();
        let event = Bash.execute(&cfg, &mut ctx, &deps).await.unwrap();
        assert_eq!(event, "error");
        assert!(ctx.get("last_error").unwrap().as_str().unwrap().contains("timed out"));
        // SIGTERM is ignored by the trap, so this only completes once the
        // post-grace-period SIGKILL lands — well under the 30s sleep.
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
