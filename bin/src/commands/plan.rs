//! Plan command implementation.

use anyhow::{Context, Result};
use xetl_lib::prelude::*;

use crate::display::plan_lines;

/// Prints the fetch plan of a run started now.
pub(crate) async fn plan(config: EtlConfig, json: bool) -> Result<()> {
    let pipeline = Pipeline::from_config(config).context("Failed to set up pipeline")?;
    let plan = pipeline
        .plan_at(chrono::Local::now().naive_local())
        .await
        .context("Failed to compute fetch plan")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        for line in plan_lines(&plan) {
            println!("{line}");
        }
    }
    Ok(())
}
