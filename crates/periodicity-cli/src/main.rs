use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod input;

#[derive(Parser)]
#[command(
    name = "periodicity",
    version,
    about = "Inspection period timelines and check-in status"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the window of periods around a reference instant
    Periods(commands::PeriodsArgs),
    /// Evaluate check-ins against a single period
    Status(commands::StatusArgs),
    /// Generate a window and evaluate check-ins against each of its periods
    Report(commands::ReportArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Periods(args) => commands::periods(args),
        Commands::Status(args) => commands::status(args),
        Commands::Report(args) => commands::report(args),
    };

    match result {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
