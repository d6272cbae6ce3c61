// SPDX-License-Identifier: MIT
//! Typed YAML machine definition (§3 MachineDefinition, §6 YAML schema).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wildcard transition source: matches the current state regardless of name,
/// evaluated after declared sources (§4.4 "Wildcard source").
pub const WILDCARD_SOURCE: &str = "*";

/// One action entry inside a transition's `actions` list.
///
/// Config is a flat mapping in YAML; `success`/`error`/`type` are pulled out
/// because the engine reads them directly, everything else is forwarded to
/// the action factory as `params` (then interpolated by C2 before `execute`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// Every other key in the YAML mapping, untouched JSON values.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// Either a plain named event or the special `timeout(N)` form (§4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent {
    Named(String),
    Timeout(u64),
}

impl TransitionEvent {
    pub fn parse(raw: &str) -> Self {
        if let Some(inner) = raw.strip_prefix("timeout(").and_then(|s| s.strip_suffix(')')) {
            if let Ok(secs) = inner.trim().parse::<u64>() {
                return TransitionEvent::Timeout(secs);
            }
        }
        TransitionEvent::Named(raw.to_string())
    }

    pub fn as_named(&self) -> Option<&str> {
        match self {
            TransitionEvent::Named(s) => Some(s),
            TransitionEvent::Timeout(_) => None,
        }
    }
}

/// A declared `from -> to` edge, triggered by `event`, running `actions` in order.
#[derive(Debug, Clone)]
pub struct Transition {
    pub from: String,
    pub to: String,
    pub event: TransitionEvent,
    pub actions: Vec<ActionConfig>,
}

impl Transition {
    pub fn matches_source(&self, current_state: &str) -> bool {
        self.from == current_state || self.from == WILDCARD_SOURCE
    }

    pub fn is_wildcard(&self) -> bool {
        self.from == WILDCARD_SOURCE
    }
}

/// Raw, untyped shape mirroring the YAML layout 1:1, before `TransitionEvent`
/// parsing. Kept separate from [`Transition`] so serde can derive it directly.
#[derive(Debug, Clone, Deserialize)]
struct RawTransition {
    from: String,
    to: String,
    event: String,
    #[serde(default)]
    actions: Vec<ActionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    machine_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawDefinition {
    name: String,
    initial_state: String,
    #[serde(default)]
    metadata: Option<RawMetadata>,
    states: Vec<String>,
    events: Vec<String>,
    transitions: Vec<RawTransition>,
}

/// Immutable, validated machine definition loaded from YAML (§3, §6).
#[derive(Debug, Clone)]
pub struct MachineDefinition {
    pub name: String,
    pub initial_state: String,
    pub machine_name_override: Option<String>,
    pub states: Vec<String>,
    pub events: Vec<String>,
    pub transitions: Vec<Transition>,
}

impl MachineDefinition {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, crate::error::ConfigError> {
        let raw: RawDefinition =
            serde_yaml::from_str(yaml).map_err(crate::error::ConfigError::Parse)?;
        let def = MachineDefinition {
            name: raw.name,
            initial_state: raw.initial_state,
            machine_name_override: raw.metadata.and_then(|m| m.machine_name),
            states: raw.states,
            events: raw.events,
            transitions: raw
                .transitions
                .into_iter()
                .map(|t| Transition {
                    from: t.from,
                    to: t.to,
                    event: TransitionEvent::parse(&t.event),
                    actions: t.actions,
                })
                .collect(),
        };
        crate::validate::validate(&def)?;
        Ok(def)
    }

    /// Effective runtime name for a running instance: the `--machine-name`
    /// CLI override takes precedence, then `metadata.machine_name`, then `name`.
    pub fn effective_machine_name<'a>(&'a self, cli_override: Option<&'a str>) -> &'a str {
        cli_override
            .or(self.machine_name_override.as_deref())
            .unwrap_or(&self.name)
    }

    /// Transitions whose `from` matches `current_state`, declared sources
    /// first (in declaration order), wildcard sources last (§4.4).
    pub fn candidates_for(&self, current_state: &str) -> Vec<&Transition> {
        let mut declared: Vec<&Transition> = Vec::new();
        let mut wildcard: Vec<&Transition> = Vec::new();
        for t in &self.transitions {
            if t.from == current_state {
                declared.push(t);
            } else if t.is_wildcard() {
                wildcard.push(t);
            }
        }
        declared.extend(wildcard);
        declared
    }
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
