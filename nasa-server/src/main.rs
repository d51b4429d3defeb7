//! Binary crate for the `nasa-server` HTTP backend.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and assembling configuration
//! - Logging setup
//! - Routing, request validation and JSON error responses

use clap::Parser;

mod cli;
mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}
