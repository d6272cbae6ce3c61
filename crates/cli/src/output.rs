// SPDX-License-Identifier: MIT
//! Shared human/JSON output helpers (§10.5 "dual human/JSON output convention").

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// `--json` is shorthand for `--output json`; either one selects JSON.
pub fn resolve(output: OutputFormat, json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        output
    }
}

/// Render a list as a text table or pretty JSON. `render_text` is skipped in JSON mode.
pub fn handle_list<T: Serialize>(format: OutputFormat, items: &[T], render_text: impl FnOnce(&[T])) {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string())),
        OutputFormat::Text => render_text(items),
    }
}

/// Format-branch helper for single-record commands (add, update-status).
pub fn format_or_json<T: Serialize>(format: OutputFormat, data: &T, text_fn: impl FnOnce()) {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())),
        OutputFormat::Text => text_fn(),
    }
}
