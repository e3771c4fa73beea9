//! lutsynth CLI - play and manage the lookup-table synth from a terminal.

mod command;
mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lutsynth")]
#[command(author, version, about = "Three-oscillator wavetable synth", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play through an output device, reading commands from stdin
    Play(commands::play::PlayArgs),

    /// Create, check and list patch files
    Patch(commands::patch::PatchArgs),

    /// Print the note table
    Notes(commands::notes::NotesArgs),

    /// List output devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => commands::play::run(args),
        Commands::Patch(args) => commands::patch::run(args),
        Commands::Notes(args) => commands::notes::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
