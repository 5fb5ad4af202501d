//! ## varsel-cli
//! **Unified operational interface**
//!
//! Varsel main entrypoint: the serving process (generation loop + HTTP
//! API) and a bounded batch mode for piping synthetic records into other
//! tooling.

use clap::Parser;

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Generate(args) => commands::run_generate(args).await,
    }
}
