//! FactQuest CLI: the main entry point.
//!
//! Commands:
//! - `chat`:  Interactive terminal chat or single-message mode
//! - `serve`: Start the browser chat gateway

use clap::{Parser, Subcommand};
use tracing::info;

mod commands;

#[derive(Parser)]
#[command(
    name = "factquest",
    about = "FactQuest: answers from its own knowledge, checks the news for current events",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat in the terminal
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Start the HTTP/WebSocket chat gateway
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Terminal chat keeps stderr quiet unless asked
    let filter = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Commands::Chat { .. }, false) => "warn",
        (Commands::Serve { .. }, false) => "info",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    load_dotenv()?;

    match cli.command {
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
    }

    Ok(())
}

/// Load `.env` if there is one. A missing file is fine; a broken one is not.
fn load_dotenv() -> Result<(), String> {
    match dotenvy::dotenv() {
        Ok(path) => info!("Read dotenv file from: {}", path.display()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No dotenv file found");
        }
        Err(e) => return Err(format!("Failed to read .env: {e}")),
    }
    Ok(())
}
