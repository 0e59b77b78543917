use clap::Parser;
use log::info;

use client::network::Client;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:11000")]
    server: String,

    /// Player name (at most 16 characters)
    #[arg(short = 'n', long, default_value = "observer")]
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Connecting to: {}", args.server);
    let mut client = Client::connect(&args.server, &args.name).await?;

    loop {
        client.recv_update().await?;
        info!("World: {}", client.world.summary());
    }
}
