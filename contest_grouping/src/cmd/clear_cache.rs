use crate::cmd::build_service;
use anyhow::{Context, Result};
use clap::Args;

#[derive(Debug, Args)]
pub struct ClearCacheArgs {}

pub async fn run(_args: ClearCacheArgs) -> Result<()> {
    let service = build_service().await?;
    service.clear_cache().await.with_context(|| {
        let message = "failed to clear contest caches";
        tracing::error!(message);
        message
    })?;

    tracing::info!("Contest caches cleared.");
    Ok(())
}
