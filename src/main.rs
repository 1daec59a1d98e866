//! NeoKrishi - Main Entry Point
//!
//! Runs the advisory API server (default) or classifies a single image.

use clap::Parser;
use neokrishi::cli::{cmd_classify, cmd_serve, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neokrishi=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port, host, model, labels, tables }) => {
            cmd_serve(host, port, model, labels, tables).await?;
        }
        Some(Commands::Classify { image, model, labels, filter }) => {
            cmd_classify(&image, model, labels, &filter)?;
        }
        None => {
            cmd_serve(None, None, None, None, None).await?;
        }
    }

    Ok(())
}
