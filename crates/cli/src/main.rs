mod commands;
mod input;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::quote::QuoteArgs;
use commands::report::ReportArgs;
use salesbook_core::EngineConfig;

/// Invoice pricing, payment schedules and revenue reports.
#[derive(Parser)]
#[command(name = "salesbook", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price invoice lines and project their payment and billing schedules
    Quote(QuoteArgs),
    /// Build a revenue report from a snapshot of persisted rows
    Report(ReportArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = EngineConfig::from_env();
    salesbook_observability::init_with(&config);

    let result = match cli.command {
        Commands::Quote(args) => commands::quote::run(args, &config),
        Commands::Report(args) => commands::report::run(args, &config),
    };

    match result.and_then(|value| Ok(serde_json::to_string_pretty(&value)?)) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
