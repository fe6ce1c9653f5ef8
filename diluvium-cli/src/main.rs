//! Diluvium CLI - Command-line interface
//!
//! Provides command-line access to a Deluge daemon through the Diluvium
//! sync engine and report generator.

mod commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "diluvium")]
#[command(about = "A remote control for the Deluge BitTorrent daemon")]
struct Cli {
    /// Base URL of the daemon web interface
    #[arg(long, default_value = "http://127.0.0.1:8112")]
    url: String,

    /// Web interface password, when authentication is required
    #[arg(long)]
    password: Option<String>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    commands::handle_command(cli.url, cli.password, cli.command).await?;

    Ok(())
}
