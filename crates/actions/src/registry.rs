// SPDX-License-Identifier: MIT
//! ActionRegistry (C4): maps a YAML `type` string to the action that handles
//! it. Built-ins are registered at startup; [`ActionRegistry::register`] lets
//! a host binary wire up additional, domain-specific actions the same way —
//! true dynamic loading from a directory of shared libraries is not
//! implemented (it would need `unsafe`, forbidden workspace-wide).

use std::collections::HashMap;
use std::sync::Arc;

use statewire_core::Clock;

use crate::action::Action;
use crate::builtins;

pub struct ActionRegistry<C: Clock> {
    factories: HashMap<String, Arc<dyn Action<C>>>,
}

impl<C: Clock> ActionRegistry<C> {
    pub fn with_builtins() -> Self {
        let mut registry = Self { factories: HashMap::new() };
        registry.register("check_database_queue", Arc::new(builtins::CheckDatabaseQueue));
        registry.register("check_events", Arc::new(builtins::CheckEvents));
        registry.register("send_event", Arc::new(builtins::SendEvent));
        registry.register("bash", Arc::new(builtins::Bash));
        registry.register("log", Arc::new(builtins::Log));
        registry.register("start_fsm", Arc::new(builtins::StartFsm));
        registry.register("complete_job", Arc::new(builtins::CompleteJob));
        registry.register("clear_events", Arc::new(builtins::ClearEvents));
        registry
    }

    pub fn register(&mut self, action_type: impl Into<String>, action: Arc<dyn Action<C>>) {
        self.factories.insert(action_type.into(), action);
    }

    pub fn get(&self, action_type: &str) -> Option<&Arc<dyn Action<C>>> {
        self.factories.get(action_type)
    }
}
