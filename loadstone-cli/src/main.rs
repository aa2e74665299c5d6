use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "loadstone", about = "Safe module loading with diagnostic capture")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load one or more modules and print their status
    Load(commands::load::LoadArgs),
    /// Interactive Load/Reload/Status shell
    Shell(commands::shell::ShellArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Load(args) => commands::load::run(args),
        Commands::Shell(args) => commands::shell::run(args),
    }
}
