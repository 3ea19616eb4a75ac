//! Run command implementation.

use anyhow::{Context, Result};
use std::sync::Arc;
use xetl_lib::prelude::*;

use crate::display::summary_lines;

/// Runs the pipeline once against the configured stores.
pub(crate) async fn run(config: EtlConfig, dry_run: bool, quiet: bool) -> Result<()> {
    let summary = execute(config, dry_run).await?;

    if !quiet {
        if dry_run {
            println!("Dry run, nothing was persisted");
        }
        for line in summary_lines(&summary) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Runs the pipeline and returns its summary.
///
/// A dry run writes to an in-memory target seeded with the current
/// watermark, so it plans exactly like a real run but persists nothing.
async fn execute(config: EtlConfig, dry_run: bool) -> Result<RunSummary> {
    let source = open_store(&config.storage, StoreRole::Source)
        .context("Failed to open source store")?;
    let mut target = open_store(&config.storage, StoreRole::Target)
        .context("Failed to open target store")?;
    if dry_run {
        target = Arc::new(dry_run_target(target.as_ref(), &config.meta.key).await?);
    }

    let pipeline = Pipeline::new(config, source, target).context("Failed to set up pipeline")?;
    pipeline.run().await.context("Pipeline run failed")
}

/// Copies the stored watermark, if any, into a fresh in-memory store.
async fn dry_run_target(real: &dyn ObjectStore, meta_key: &str) -> Result<MemoryStore> {
    let memory = MemoryStore::new();
    match real.get(meta_key).await {
        Ok(body) => memory.put(meta_key, body).await?,
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e).context("Failed to read watermark"),
    }
    Ok(memory)
}
