use std::path::Path;
use std::sync::Arc;

use blockstage_core::seed::seed_demo;
use blockstage_core::{Config, Pipeline};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var_os("BLOCKSTAGE_CONFIG") {
        Some(path) => Config::load(Path::new(&path))?,
        None => Config::default(),
    };
    let addr = std::env::var("BLOCKSTAGE_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    let pipeline = Arc::new(Pipeline::from_config(&config));
    if std::env::var_os("BLOCKSTAGE_SEED_DEMO").is_some() {
        seed_demo(pipeline.store())?;
        info!("seeded demo files");
    }
    std::fs::create_dir_all(&config.staging_dir)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, staging = %config.staging_dir.display(), "listening");
    axum::serve(listener, blockstage_http::router(pipeline)).await?;
    Ok(())
}
