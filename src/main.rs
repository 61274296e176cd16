//! deploy-deck - Android device lister
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ddeck_core::logging;
use tracing::{error, info};

/// deploy-deck - Lists AVDs and connected Android devices as one list
#[derive(Parser, Debug)]
#[command(name = "ddeck")]
#[command(about = "Lists AVDs and connected Android devices as one list", long_about = None)]
struct Args {
    /// Project directory holding `.ddeck/config.toml`
    #[arg(long, value_name = "PATH", global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the device list once
    List {
        /// Output a JSON event instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Poll for device changes until Ctrl+C
    Watch {
        /// Output NDJSON events instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Write a default .ddeck/config.toml
    Init,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Logging goes to a file so stdout stays clean for JSON output
    if let Err(e) = logging::init() {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let args = Args::parse();

    let project_path = args
        .project
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    info!("═══════════════════════════════════════════════════════");
    info!("Command: {:?}", args.command);
    info!("Project: {}", project_path.display());
    info!("═══════════════════════════════════════════════════════");

    let result = match args.command.unwrap_or(Command::List { json: false }) {
        Command::List { json } => deploy_deck::run_list(&project_path, json).await,
        Command::Watch { json } => deploy_deck::run_watch(&project_path, json).await,
        Command::Init => deploy_deck::run_init(&project_path).map(|_| ()),
    };

    if let Err(ref e) = result {
        error!("Command failed: {:?}", e);
        if let Ok(log_file) = logging::get_current_log_file() {
            eprintln!("See {} for details", log_file.display());
        }
    }

    info!("deploy-deck exiting");
    Ok(result?)
}
