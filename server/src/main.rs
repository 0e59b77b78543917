use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use server::config::Settings;
use server::network::GameServer;

/// Main-method of the application.
/// Parses command-line arguments, loads the game settings and runs the
/// server until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, default_value = "11000")]
        port: u16,
        /// Path to a JSON settings file
        #[clap(short, long)]
        config: Option<PathBuf>,
    }

    // Parse command line arguments
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };

    let address = format!("{}:{}", args.host, args.port);
    let server = GameServer::bind(&address, settings).await?;
    info!("Server listening on {}", server.local_addr()?);

    // Handle shutdown gracefully
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped with error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
