pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::ask::AskArgs;

#[derive(Debug, Parser)]
#[command(
    name = "execlens",
    about = "execlens operator CLI",
    long_about = "Ask security, cost and ROI questions, inspect routing, and check runtime readiness.",
    after_help = "Examples:\n  execlens ask \"What is my monthly spend?\"\n  execlens classify \"are we getting value from guardduty\"\n  execlens doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Route a question through the orchestrator and print the answer")]
    Ask {
        query: String,
        #[arg(long, help = "Region passed to every tool (defaults to defaults.region)")]
        region: Option<String>,
        #[arg(long, help = "Lookback window such as 30d or 12m (defaults to defaults.time_range)")]
        time_range: Option<String>,
        #[arg(long, help = "Run the multi-domain overview instead of single-domain routing")]
        overview: bool,
        #[arg(long, help = "Always answer with the narrative form")]
        narrative: bool,
        #[arg(long, help = "Emit the structured response as JSON")]
        json: bool,
    },
    #[command(about = "Show keyword scores and the routed domain without calling any tool")]
    Classify { query: String },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, gateway setup, and a live probe of the security backend")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Ask { query, region, time_range, overview, narrative, json } => {
            commands::ask::run(AskArgs { query, region, time_range, overview, narrative, json })
        }
        Command::Classify { query } => commands::classify::run(&query),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Diagnostics go to stderr so command output stays parseable.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("EXECLENS_CLI_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
