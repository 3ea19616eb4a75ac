//! Terminal output for the xetl CLI.

use chrono::NaiveDate;
use xetl_lib::{FetchPlan, META_PROCESS_DATE_FORMAT, RunSummary, Watermark};

fn date_or_none(date: NaiveDate) -> String {
    if date == NaiveDate::MAX {
        "none (all dates recorded)".to_string()
    } else {
        date.to_string()
    }
}

/// Renders a fetch plan.
pub(crate) fn plan_lines(plan: &FetchPlan) -> Vec<String> {
    let mut lines = vec![format!(
        "Effective start: {}",
        date_or_none(plan.effective_start)
    )];
    if let Some(lookback) = plan.lookback {
        lines.push(format!("Lookback day:    {lookback}"));
    }

    if plan.is_empty() {
        lines.push("Nothing to fetch".to_string());
    } else {
        lines.push(format!("Partitions ({}):", plan.dates.len()));
        lines.extend(plan.dates.iter().map(|date| {
            let marker = if Some(*date) == plan.lookback {
                " (lookback)"
            } else {
                ""
            };
            format!("  {date}{marker}")
        }));
    }
    lines
}

/// Renders the outcome of a run.
pub(crate) fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Partitions read: {}", summary.plan.dates.len()),
        format!("Rows extracted:  {}", summary.rows_extracted),
        format!("Rows reported:   {}", summary.rows_reported),
    ];
    match &summary.report_key {
        Some(key) => lines.push(format!("Report written:  {key}")),
        None => lines.push("Report written:  none (empty report)".to_string()),
    }
    lines.push(format!("Dates recorded:  {}", summary.dates_recorded));
    lines
}

/// Renders the watermark as a table.
pub(crate) fn watermark_lines(watermark: &Watermark) -> Vec<String> {
    let mut lines = vec![
        format!("{:<12} {:<20}", "SOURCE DATE", "PROCESSED AT"),
        "-".repeat(33),
    ];
    lines.extend(watermark.entries().iter().map(|entry| {
        format!(
            "{:<12} {:<20}",
            entry.source_date.to_string(),
            entry.processed_at.format(META_PROCESS_DATE_FORMAT).to_string()
        )
    }));
    lines.push(format!(
        "{} rows, {} distinct dates",
        watermark.len(),
        watermark.processed_dates().len()
    ));
    lines
}
