use clap::{Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use orchard::cli::commands;
use orchard::config::game::GameConfig;

#[derive(Parser)]
#[command(name = "orchard")]
#[command(about = "Collect fruit from a growing orchard before it spoils")]
#[command(version)]
struct Cli {
    /// Path to the game configuration file
    #[arg(short, long, default_value = "orchard.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random orchard and print it
    Generate,

    /// Play an interactive game on the terminal
    Play {
        /// Path to an explicit board layout instead of a random orchard
        #[arg(short, long)]
        layout: Option<String>,
    },

    /// Let the autopilot play a game and report the outcome
    Simulate {
        /// Path to an explicit board layout instead of a random orchard
        #[arg(short, long)]
        layout: Option<String>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();

    let config = match GameConfig::load_or_default(Path::new(&cli.config)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_level);

    let result = match cli.command {
        Commands::Generate => commands::generate(&config),
        Commands::Play { layout } => commands::play(&config, layout.as_deref()),
        Commands::Simulate { layout, json } => {
            commands::simulate(&config, layout.as_deref(), json)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
