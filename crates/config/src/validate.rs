// SPDX-License-Identifier: MIT
//! Structural validation for a parsed [`MachineDefinition`] (§3 invariants).

use crate::definition::{MachineDefinition, TransitionEvent, WILDCARD_SOURCE};
use crate::error::ConfigError;

pub fn validate(def: &MachineDefinition) -> Result<(), ConfigError> {
    if !def.states.iter().any(|s| s == &def.initial_state) {
        return Err(ConfigError::UnknownInitialState { initial_state: def.initial_state.clone() });
    }

    for (index, t) in def.transitions.iter().enumerate() {
        if t.from != WILDCARD_SOURCE && !def.states.iter().any(|s| s == &t.from) {
            return Err(ConfigError::UnknownFromState { index, from: t.from.clone() });
        }
        if !def.states.iter().any(|s| s == &t.to) {
            return Err(ConfigError::UnknownToState { index, to: t.to.clone() });
        }
        if let TransitionEvent::Named(name) = &t.event {
            if !def.events.iter().any(|e| e == name) {
                return Err(ConfigError::UnknownEvent { index, event: name.clone() });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
