use clap::{Parser, Subcommand};
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use peagarden::cli::commands;
use peagarden::config::simulation::SimulationConfig;
use peagarden::persistence::{self, SaveStore};

#[derive(Parser)]
#[command(name = "peagarden")]
#[command(about = "Breed peas, learn Mendel's laws, and keep your customers happy")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the shop and play in the terminal
    Play {
        /// Ignore existing saves and start a new garden
        #[arg(long)]
        fresh: bool,
    },

    /// Print the newest valid save
    Inspect,

    /// Manage save files
    Saves {
        #[command(subcommand)]
        action: SaveAction,
    },
}

#[derive(Subcommand)]
enum SaveAction {
    /// List available saves
    List {
        /// Save directory (defaults to the configured one)
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Make an older save the one `play` resumes from
    Restore {
        /// Path to the save file
        file: String,
    },
}

fn load_config(path: &str) -> SimulationConfig {
    match SimulationConfig::load_or_default(Path::new(path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(&cli.config);
    init_tracing(&config.log_level);
    if !Path::new(&cli.config).exists() {
        warn!(path = %cli.config, "Config file not found, using defaults");
    }

    match cli.command {
        Commands::Play { fresh } => {
            if let Err(e) = commands::run_session(&config, fresh).await {
                eprintln!("Session error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Inspect => {
            if let Err(e) = commands::inspect(&config) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Saves { action } => match action {
            SaveAction::List { dir } => {
                let dir = dir.unwrap_or_else(|| config.save_directory.clone());
                let save_dir = Path::new(&dir);
                match persistence::list_snapshots(save_dir) {
                    Ok(saves) => {
                        if saves.is_empty() {
                            println!("No saves found in {}", save_dir.display());
                        } else {
                            println!("{:<40} {:>8} {:>10}", "File", "Tick", "Size");
                            println!("{}", "-".repeat(60));
                            for s in &saves {
                                let name = s
                                    .path
                                    .file_name()
                                    .and_then(|n| n.to_str())
                                    .unwrap_or("?");
                                println!("{:<40} {:>8} {:>7} KB", name, s.tick_count, s.file_size / 1024);
                            }
                            println!("\n{} save(s) in {}", saves.len(), save_dir.display());
                        }
                    }
                    Err(e) => {
                        eprintln!("Error listing saves: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            SaveAction::Restore { file } => {
                let store = SaveStore::new(&config.save_directory, config.max_saves as usize);
                match store.restore(Path::new(&file)) {
                    Ok(path) => {
                        println!("Restored {} as {}", file, path.display());
                        if let Some(state) = store.load() {
                            commands::print_status(&state);
                        }
                    }
                    Err(e) => {
                        eprintln!("Error restoring save: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        },
    }
}
