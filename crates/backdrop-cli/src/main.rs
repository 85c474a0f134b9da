//! Backdrop CLI
//!
//! Command-line interface for the wallpaper catalog

use backdrop_core::logging_facility;
use backdrop_core::BackdropConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "backdrop")]
#[command(about = "Backdrop - wallpaper asset catalog", long_about = None)]
struct Cli {
    /// Config file (default: $BACKDROP_CONFIG, then ./backdrop.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List catalogued wallpapers, newest first
    List,
    /// Show the current wallpaper
    Current,
    /// Downscale and store an image, then make it current
    Add(commands::catalog::AddArgs),
    /// Delete a wallpaper by id
    Delete(commands::catalog::IdArgs),
    /// Make a wallpaper current
    Use(commands::catalog::IdArgs),
    /// Export a wallpaper's stored bytes
    Export(commands::catalog::ExportArgs),
    /// Measure an image file's luminance
    Classify(commands::appearance::ClassifyArgs),
    /// Foreground style for the current wallpaper
    Contrast,
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = BackdropConfig::load(cli.config.as_deref())?;
    logging_facility::init(config.logging.profile);

    match cli.command {
        Commands::Classify(args) => commands::appearance::classify(args).await,
        Commands::Contrast => commands::appearance::contrast(&config).await,
        Commands::List => commands::catalog::list(&config).await,
        Commands::Current => commands::catalog::current(&config).await,
        Commands::Add(args) => commands::catalog::add(&config, args).await,
        Commands::Delete(args) => commands::catalog::delete(&config, args).await,
        Commands::Use(args) => commands::catalog::use_asset(&config, args).await,
        Commands::Export(args) => commands::catalog::export(&config, args).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
