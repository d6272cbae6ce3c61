// SPDX-License-Identifier: MIT
//! ActionError (§7, kind 2): recoverable by design. The engine catches it at
//! the per-action call site, records `last_error`/`last_error_command` on the
//! context, and treats it as the literal `error` pseudo-event — if no
//! transition for the current state matches that event, the tick no-ops.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("action {action} missing required param {param:?}")]
    MissingParam { action: &'static str, param: &'static str },

    #[error("action {action} param {param:?} has the wrong shape: {reason}")]
    InvalidParam { action: &'static str, param: &'static str, reason: String },

    #[error("store error: {0}")]
    Store(#[from] statewire_store::StoreError),

    #[error("bus error: {0}")]
    Bus(#[from] statewire_bus::BusError),

    #[error("failed to spawn subprocess: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("command timed out after {timeout_secs}s: {command}")]
    Timeout { command: String, timeout_secs: u64 },

    #[error("no action registered for type {0:?}")]
    UnknownType(String),
}
