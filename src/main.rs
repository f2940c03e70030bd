mod server;
mod tools;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mythiq::config::{expand_tilde, MythiqConfig};

#[derive(Parser)]
#[command(name = "mythiq", version, about = "Session memory and game personalization MCP server")]
struct Cli {
    /// Config file (defaults to ~/.mythiq/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (transport from config: stdio or http)
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MythiqConfig::load_from(expand_tilde(path))?,
        None => MythiqConfig::load()?,
    };

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => match config.server.transport.as_str() {
            "stdio" => server::serve_stdio(config).await?,
            "http" => server::serve_http(config).await?,
            other => bail!("unknown transport: {other} (expected stdio or http)"),
        },
    }

    Ok(())
}
