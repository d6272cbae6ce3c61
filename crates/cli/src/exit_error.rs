// SPDX-License-Identifier: MIT
//! Carries a process exit code (§6 "Exit codes") so `main` handles process
//! termination in one place instead of commands calling `std::process::exit`
//! directly.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Usage errors (bad flags, malformed `--data`/`--initial-context` JSON) exit 2.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// Anything else unhandled exits 1.
    pub fn unhandled(message: impl Into<String>) -> Self {
        Self::new(1, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<anyhow::Error> for ExitError {
    fn from(err: anyhow::Error) -> Self {
        Self::unhandled(err.to_string())
    }
}
