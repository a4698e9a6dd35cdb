use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;
use voicemesh_relay::{Relay, RelayConfig, serve};

#[derive(Parser)]
#[command(name = "cargo-voicemesh")]
#[command(bin_name = "cargo-voicemesh")]
enum Cli {
    Voicemesh(VoicemeshArgs),
}

#[derive(clap::Args)]
struct VoicemeshArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Relay {
        #[arg(long, default_value = "0.0.0.0:3000")]
        bind: SocketAddr,

        #[arg(long, default_value = "/voice")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli::Voicemesh(args) = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match args.command {
        Commands::Relay { bind, path } => {
            if !path.starts_with('/') {
                anyhow::bail!("Route path must start with '/', got {:?}", path);
            }

            println!("{}", "🎙  Starting voicemesh relay...".green().bold());
            println!("   🔌 Bind: {}", bind);
            println!("   📡 Path: {}", path.cyan());

            serve(RelayConfig { bind, path }, Relay::new()).await?;

            println!("{}", "👋 Relay stopped".green().bold());
        }
    }

    Ok(())
}
