use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "regrow", version, about = "Regrow CLI")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record, edit and list relapses
    Relapse {
        #[command(subcommand)]
        action: commands::relapse::RelapseAction,
    },
    /// Current streak, checkpoint, growth stage and achievements
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Streak statistics
    Stats {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Live progress, celebrating achievements as they unlock
    Watch(commands::watch::WatchArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("REGROW_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Relapse { action } => commands::relapse::run(action),
        Commands::Progress { action } => commands::progress::run(action),
        Commands::Stats { json } => commands::stats::run(json),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
