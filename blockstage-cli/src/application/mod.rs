pub mod handlers;

use std::process::ExitCode;

use crate::presentation::cli::{Cli, Commands};
use blockstage_core::Pipeline;
use blockstage_core::error::Result;
use clap::Parser;

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = handlers::resolve_config(&cli.opts)?;
    let pipeline = Pipeline::from_config(&config);

    match cli.command {
        Commands::Seed { demo, file, count } => {
            handlers::handle_seed(&pipeline, demo, file, count)
        }
        Commands::Reset { staging, source } => {
            handlers::handle_reset(&pipeline, staging, source)
        }
        Commands::Blocks { file } => handlers::handle_blocks(&pipeline, &file),
        Commands::Download { file } => handlers::handle_download(&pipeline, &file),
        Commands::Merge { file } => handlers::handle_merge(&pipeline, &file),
        Commands::Fetch { file } => handlers::handle_fetch(&pipeline, &file),
    }
}
