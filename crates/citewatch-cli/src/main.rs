mod monitor;
mod roi;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "citewatch")]
#[command(about = "Brand mention monitoring across AI platforms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a one-off monitoring session and print the combined analytics.
    Monitor(monitor::MonitorArgs),
    /// ROI reports for tracked investments.
    Roi(roi::RoiArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Monitor(args) => monitor::run(args).await,
        Commands::Roi(args) => roi::run(args).await,
    }
}
