// SPDX-License-Identifier: MIT
//! ExecutionContext: the mutable per-machine dictionary threaded through every
//! action (§3 ExecutionContext).

use crate::job::Job;
use serde_json::{Map, Value};

/// Well-known keys every context carries once the corresponding event has
/// happened; actions are free to add more.
pub mod keys {
    pub const MACHINE_NAME: &str = "machine_name";
    pub const JOB_ID: &str = "job_id";
    pub const CURRENT_JOB: &str = "current_job";
    pub const EVENT_DATA: &str = "event_data";
    pub const LAST_ERROR: &str = "last_error";
    pub const LAST_ERROR_COMMAND: &str = "last_error_command";
}

/// A JSON object used as the interpolation context and action scratch space.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    root: Map<String, Value>,
}

impl ExecutionContext {
    pub fn new(machine_name: &str) -> Self {
        let mut root = Map::new();
        root.insert(keys::MACHINE_NAME.to_string(), Value::String(machine_name.to_string()));
        Self { root }
    }

    /// Seed the context with user-injected initial values (`--initial-context`),
    /// merged in before anything else runs.
    pub fn with_initial(mut self, initial: Map<String, Value>) -> Self {
        for (k, v) in initial {
            self.root.insert(k, v);
        }
        self
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.root.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.root.remove(key)
    }

    pub fn as_object(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Resolve a dotted path (`a.b.c`) against the context root.
    pub fn resolve_path(&self, path: &str) -> Option<&Value> {
        resolve_path_ref(&self.root, path)
    }

    /// On job claim: set `current_job` and flatten its `data` object keys
    /// into the context root for bare `{key}` interpolation.
    pub fn claim_job(&mut self, job: &Job) {
        self.root.insert(keys::JOB_ID.to_string(), Value::String(job.id.to_string()));
        self.root.insert(
            keys::CURRENT_JOB.to_string(),
            serde_json::to_value(job).unwrap_or(Value::Null),
        );
        for (k, v) in job.data_as_flat_pairs() {
            self.root.insert(k, v);
        }
    }

    pub fn set_event_data(&mut self, payload: Value) {
        self.root.insert(keys::EVENT_DATA.to_string(), payload);
    }

    pub fn set_last_error(&mut self, message: &str, command: Option<&str>) {
        self.root.insert(keys::LAST_ERROR.to_string(), Value::String(message.to_string()));
        if let Some(cmd) = command {
            self.root
                .insert(keys::LAST_ERROR_COMMAND.to_string(), Value::String(cmd.to_string()));
        }
    }
}

/// Walk a dotted path over nested objects. Returns `None` on a missing key
/// or a non-object intermediate node.
fn resolve_path_ref<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = root.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
