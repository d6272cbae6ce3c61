// SPDX-License-Identifier: MIT
//! ConfigError (§7, kind 1): YAML violates a `MachineDefinition` invariant.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse machine definition yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("initial_state {initial_state:?} is not declared in states")]
    UnknownInitialState { initial_state: String },

    #[error("transition {index}: from state {from:?} is not declared in states")]
    UnknownFromState { index: usize, from: String },

    #[error("transition {index}: to state {to:?} is not declared in states")]
    UnknownToState { index: usize, to: String },

    #[error("transition {index}: event {event:?} is not declared in events")]
    UnknownEvent { index: usize, event: String },
}
