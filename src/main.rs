//! PortAtlas binary entry point.

use anyhow::Result;
use clap::Parser;
use portatlas::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise -v raises the level
    let default_level = match cli.verbose {
        0 => "portatlas=warn",
        1 => "portatlas=debug",
        _ => "portatlas=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    cli.run().await
}
