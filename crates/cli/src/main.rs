// SPDX-License-Identifier: MIT
//! statewire: one binary fronting every process role in the system — an
//! engine instance, the broadcaster, the diagram provider, job admin, and a
//! read-only event tail (§6 "CLI surface").

mod cli;
mod commands;
mod env;
mod exit_error;
mod output;

use clap::Parser;
use cli::{Cli, Command, EngineCommand, JobsCommand};
use exit_error::ExitError;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    if let Err(err) = dispatch(cli.command).await {
        eprintln!("error: {err}");
        std::process::exit(err.code);
    }
}

async fn dispatch(command: Command) -> Result<(), ExitError> {
    match command {
        Command::Engine { command: EngineCommand::Run(args) } => commands::engine::run(args).await,
        Command::Jobs { command } => match command {
            JobsCommand::List(args) => commands::jobs::list(args).await,
            JobsCommand::Add(args) => commands::jobs::add(args).await,
            JobsCommand::UpdateStatus(args) => commands::jobs::update_status(args).await,
            JobsCommand::Delete(args) => commands::jobs::delete(args).await,
        },
        Command::Ui(args) => commands::ui::run(args).await,
        Command::Diagram(args) => commands::diagram::run(args).await,
        Command::Events(args) => commands::events::run(args).await,
    }
}
