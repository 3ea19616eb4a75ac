//! Meta command implementation.

use anyhow::{Context, Result};
use xetl_lib::prelude::*;

use crate::display::watermark_lines;

/// Prints the watermark rows.
pub(crate) async fn meta(config: EtlConfig) -> Result<()> {
    let pipeline = Pipeline::from_config(config).context("Failed to set up pipeline")?;
    let store = pipeline.watermark();

    match store.read().await.context("Failed to read watermark")? {
        Some(watermark) => {
            for line in watermark_lines(&watermark) {
                println!("{line}");
            }
        }
        None => println!("No watermark at '{}' yet", store.key()),
    }
    Ok(())
}
