// northwind/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug northwind run ... to see the details
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            project_dir,
            stage,
            no_products,
        } => commands::run::execute(project_dir, stage, no_products).await,
        Commands::Report { project_dir, limit } => commands::report::execute(project_dir, limit),
        Commands::Inspect { file, limit } => commands::inspect::execute(file, limit),
    }
}
