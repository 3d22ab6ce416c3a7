mod commands;
mod config;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;

use commands::assistance::{AnalyzeArgs, CalcArgs, ScheduleArgs};
use commands::borrower::ProfileArgs;
use config::CliConfig;

/// Down payment assistance and borrower profile calculations
#[derive(Parser)]
#[command(
    name = "dpa",
    version,
    about = "Down payment assistance calculations for loan officers",
    long_about = "Prices down payment assistance programs against a transaction with \
                  decimal precision: assistance principal, scheduled monthly payment, \
                  and the payment counted toward qualifying ratios. Also summarises \
                  borrower profiles of up to four borrowers."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (defaults to DPA_OUTPUT, then json)
    #[arg(long, global = true)]
    output: Option<OutputFormat>,

    /// Log filter, e.g. debug or dpa_core=trace (defaults to DPA_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assistance principal for one program
    Principal(CalcArgs),
    /// Scheduled monthly payment for one program
    Payment(CalcArgs),
    /// Monthly payment counted toward qualifying ratios
    QualifyingPayment(CalcArgs),
    /// Price and total every program on a loan option
    Analyze(AnalyzeArgs),
    /// Month-by-month repayment of an interest-only or amortizing program
    Schedule(ScheduleArgs),
    /// Summarise a borrower profile
    Profile(ProfileArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(2);
        }
    };

    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    if let Err(e) = telemetry::init(log_level) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(2);
    }

    let format = cli.output.unwrap_or(config.output);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Principal(args) => commands::assistance::run_principal(args),
        Commands::Payment(args) => commands::assistance::run_payment(args),
        Commands::QualifyingPayment(args) => commands::assistance::run_qualifying_payment(args),
        Commands::Analyze(args) => commands::assistance::run_analyze(args),
        Commands::Schedule(args) => commands::assistance::run_schedule(args),
        Commands::Profile(args) => commands::borrower::run_profile(args),
        Commands::Version => {
            println!("dpa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            debug!(?format, "writing output");
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
