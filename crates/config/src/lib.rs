// SPDX-License-Identifier: MIT
//! statewire-config: typed YAML machine definitions (§3 MachineDefinition,
//! §6 YAML schema) with startup validation (§7 ConfigError).

pub mod definition;
pub mod error;
pub mod validate;

pub use definition::{ActionConfig, MachineDefinition, Transition, TransitionEvent};
pub use error::ConfigError;
