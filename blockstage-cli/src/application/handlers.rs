use std::io::Write;
use std::process::ExitCode;

use blockstage_core::config::SourceKind;
use blockstage_core::error::{Result, StageError};
use blockstage_core::seed::{seed_demo, seed_file};
use blockstage_core::{BlockSource, BlockStore, Config, MergeReport, Pipeline};
use serde::Serialize;

use crate::presentation::cli::GlobalOpts;

pub fn resolve_config(opts: &GlobalOpts) -> Result<Config> {
    let mut config = match &opts.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &opts.source_dir {
        config.source_dir = dir.clone();
    }
    if let Some(dir) = &opts.staging_dir {
        config.staging_dir = dir.clone();
    }
    if let Some(marker) = &opts.marker {
        config.corruption_marker = marker.clone();
    }
    config.parallel |= opts.parallel;
    // each invocation is its own process; seeded blocks would not survive
    if config.source == SourceKind::Memory {
        return Err(StageError::Config(
            "source = \"memory\" is only usable in-process; the CLI needs source = \"fs\""
                .to_string(),
        ));
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

fn status(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

pub fn handle_seed(
    pipeline: &Pipeline,
    demo: bool,
    file: Option<String>,
    count: Option<u64>,
) -> Result<ExitCode> {
    match (demo, file, count) {
        (true, _, _) => {
            seed_demo(pipeline.store())?;
            eprintln!("seed: demo files written");
        }
        (false, Some(file), Some(count)) => {
            seed_file(pipeline.store(), &file, count)?;
            eprintln!("seed: {file} with {count} blocks");
        }
        _ => {
            return Err(StageError::Config(
                "seed needs --demo or FILE COUNT".to_string(),
            ));
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn handle_reset(pipeline: &Pipeline, staging: bool, source: bool) -> Result<ExitCode> {
    // no flag means staging only
    if staging || !source {
        pipeline.staging().reset()?;
        eprintln!("reset: {}", pipeline.staging().root().display());
    }
    if source {
        pipeline.store().reset()?;
        eprintln!("reset: source");
    }
    Ok(ExitCode::SUCCESS)
}

pub fn handle_blocks(pipeline: &Pipeline, file: &str) -> Result<ExitCode> {
    let listing = pipeline.store().list_blocks(file)?;
    println!("{}: {} blocks", listing.file_id, listing.count());
    for b in &listing.blocks {
        println!("#{:<5} {}", b.ordinal, b);
    }
    Ok(ExitCode::SUCCESS)
}

fn download(pipeline: &Pipeline, file: &str) -> Result<bool> {
    let result = pipeline.download_file(file)?;
    print_json(&result)?;
    for n in pipeline.notifications().list() {
        eprintln!("notify: {} {}", n.kind, n.data);
    }
    Ok(result.success)
}

fn merge(pipeline: &Pipeline, file: &str) -> Result<bool> {
    let report = MergeReport::from(&pipeline.merge_file(file));
    print_json(&report)?;
    Ok(report.is_success())
}

pub fn handle_download(pipeline: &Pipeline, file: &str) -> Result<ExitCode> {
    download(pipeline, file).map(status)
}

pub fn handle_merge(pipeline: &Pipeline, file: &str) -> Result<ExitCode> {
    merge(pipeline, file).map(status)
}

pub fn handle_fetch(pipeline: &Pipeline, file: &str) -> Result<ExitCode> {
    let downloaded = download(pipeline, file)?;
    let merged = merge(pipeline, file)?;
    Ok(status(downloaded && merged))
}
