//! peq CLI - command-line front end for the four-band parametric equalizer.

mod commands;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "peq")]
#[command(author, version, about = "Four-band parametric EQ", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the equalizer parameters with their ranges and defaults
    Params(commands::params::ParamsArgs),

    /// Print the magnitude response of a settings set
    Response(commands::response::ResponseArgs),

    /// Process a WAV file through the equalizer
    Process(commands::process::ProcessArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Params(args) => commands::params::run(args),
        Commands::Response(args) => commands::response::run(args),
        Commands::Process(args) => commands::process::run(args),
    }
}
