//! Serve subcommand implementation.
//!
//! Runs the HTTP scan API until the process is stopped.

use anyhow::{Context, Result};
use clap::Parser;

use crate::server;

/// Run the HTTP scan API.
#[derive(Parser, Debug)]
pub struct ServeCommand {
    /// Address and port to listen on
    #[arg(long, env = "PORTATLAS_BIND", default_value = "0.0.0.0:8000")]
    pub bind: String,
}

impl ServeCommand {
    /// Execute the serve command.
    pub async fn execute(&self) -> Result<()> {
        server::serve(&self.bind)
            .await
            .with_context(|| format!("api server on '{}' failed", self.bind))
    }
}
