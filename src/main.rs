//! Unified trojan-rs CLI.
//!
//! - `trojan-rs agent` - Run the node agent (stats API, directory sync, reporting)

use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Trojan-rs unified CLI.
#[derive(Parser)]
#[command(
    name = "trojan-rs",
    version,
    about = "Per-user traffic accounting and user directory sync for trojan nodes",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the node agent.
    #[command(name = "agent")]
    Agent(trojan_agent::AgentArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Agent(args) => trojan_agent::cli::run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
