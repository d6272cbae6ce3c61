// SPDX-License-Identifier: MIT
//! The uniform action contract (§4.3): every action is config-parameterized
//! and returns the event name its outcome should be treated as.

use async_trait::async_trait;
use statewire_config::ActionConfig;
use statewire_core::{Clock, ExecutionContext};

use crate::deps::ActionDeps;
use crate::error::ActionError;

/// One built-in action. `config` carries this transition's entry already
/// interpolated against the current [`ExecutionContext`] by the engine
/// (§4.2) — actions never interpolate their own params.
#[async_trait]
pub trait Action<C: Clock>: Send + Sync {
    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &mut ExecutionContext,
        deps: &ActionDeps<C>,
    ) -> Result<String, ActionError>;
}

/// Read a required string param out of an action's flattened config.
pub(crate) fn require_str<'a>(
    config: &'a ActionConfig,
    action: &'static str,
    param: &'static str,
) -> Result<&'a str, ActionError> {
    config
        .params
        .get(param)
        .and_then(|v| v.as_str())
        .ok_or(ActionError::MissingParam { action, param })
}

/// Read an optional string param, defaulting when absent.
pub(crate) fn str_or<'a>(config: &'a ActionConfig, param: &str, default: &'a str) -> &'a str {
    config.params.get(param).and_then(|v| v.as_str()).unwrap_or(default)
}

/// Read a required array-of-strings param (`event_types` and similar).
pub(crate) fn require_str_list(
    config: &ActionConfig,
    action: &'static str,
    param: &'static str,
) -> Result<Vec<String>, ActionError> {
    let arr = config
        .params
        .get(param)
        .and_then(|v| v.as_array())
        .ok_or(ActionError::MissingParam { action, param })?;
    arr.iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| ActionError::InvalidParam {
                action,
                param,
                reason: "expected a list of strings".to_string(),
            })
        })
        .collect()
}
