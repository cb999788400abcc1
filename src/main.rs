#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

use anyhow::Result;
use clap::Parser;

use planwatch::app::dispatch::dispatch;
use planwatch::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // rustls cannot pick a process-level CryptoProvider on its own.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();
    dispatch(cli).await
}
