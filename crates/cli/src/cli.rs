// SPDX-License-Identifier: MIT
//! Top-level argument parsing (§6 "CLI surface"). One binary, one subcommand
//! per responsibility instead of one binary per role — subcommand names
//! still match (`engine run`, `jobs ...`, `ui`, `events`).

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "statewire", version, about = "YAML-configured finite-state-machine runtime")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a machine's execution engine.
    Engine {
        #[command(subcommand)]
        command: EngineCommand,
    },
    /// Job queue administration.
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },
    /// Run the standalone WebSocket broadcaster process.
    Ui(UiArgs),
    /// Run the diagram-serving HTTP process.
    Diagram(DiagramArgs),
    /// Tail the broadcaster's event stream, read-only.
    Events(EventsArgs),
}

#[derive(Subcommand)]
pub enum EngineCommand {
    /// Run an engine instance for one named machine.
    Run(EngineRunArgs),
}

#[derive(Args)]
pub struct EngineRunArgs {
    /// Path to the machine's YAML definition.
    #[arg(long)]
    pub config: String,
    /// Overrides `metadata.machine_name` (and the YAML's bare `name`).
    #[arg(long)]
    pub machine_name: Option<String>,
    /// JSON object merged into the engine's initial execution context.
    #[arg(long)]
    pub initial_context: Option<String>,
}

#[derive(Subcommand)]
pub enum JobsCommand {
    /// List jobs, newest first.
    List(JobsListArgs),
    /// Enqueue a new job.
    Add(JobsAddArgs),
    /// Force a job's status.
    UpdateStatus(JobsUpdateStatusArgs),
    /// Delete a job row.
    Delete(JobsDeleteArgs),
}

#[derive(Args)]
pub struct JobsListArgs {
    #[arg(long, value_enum, default_value_t = crate::output::OutputFormat::Text)]
    pub output: crate::output::OutputFormat,
    /// Shorthand for `--output json`.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct JobsAddArgs {
    #[arg(long = "type")]
    pub job_type: String,
    /// JSON object.
    #[arg(long)]
    pub data: Option<String>,
    #[arg(long, default_value_t = 100)]
    pub priority: i64,
    #[arg(long, value_enum, default_value_t = crate::output::OutputFormat::Text)]
    pub output: crate::output::OutputFormat,
    /// Shorthand for `--output json`.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct JobsUpdateStatusArgs {
    pub job_id: String,
    /// One of: pending, processing, completed, failed.
    pub status: String,
    #[arg(long, value_enum, default_value_t = crate::output::OutputFormat::Text)]
    pub output: crate::output::OutputFormat,
    /// Shorthand for `--output json`.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct JobsDeleteArgs {
    pub job_id: String,
}

#[derive(Args)]
pub struct UiArgs {
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Args)]
pub struct DiagramArgs {
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Args)]
pub struct EventsArgs {
    /// Only show frames for this machine.
    #[arg(long)]
    pub machine: Option<String>,
    #[arg(long, value_enum, default_value_t = EventsFormat::Human)]
    pub format: EventsFormat,
    /// Stop after N seconds; runs until interrupted when omitted.
    #[arg(long)]
    pub duration: Option<u64>,
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum EventsFormat {
    Human,
    Json,
    Compact,
}
