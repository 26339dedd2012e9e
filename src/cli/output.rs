//! CLI output formatting

use crate::{
    core::{RunStatus, RunSummary},
    execution::ExecutionEvent,
    store::{Record, RequestState, RequestStatus},
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over a pipeline's steps
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    if let Ok(bar_style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        progress.set_style(bar_style.progress_chars("#>-"));
    }
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a run status for display
pub fn format_run_status(status: RunStatus) -> String {
    match status {
        RunStatus::Running => style("RUNNING").yellow().to_string(),
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format a request status for display
pub fn format_request_status(status: RequestStatus) -> String {
    match status {
        RequestStatus::Idle => style("IDLE").dim().to_string(),
        RequestStatus::Pending => style("PENDING").yellow().to_string(),
        RequestStatus::Succeeded => style("SUCCEEDED").green().to_string(),
        RequestStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted {
            pipeline_name,
            total_steps,
            ..
        } => format!(
            "{} Starting {} ({} steps)",
            ROCKET,
            style(pipeline_name).bold(),
            total_steps
        ),
        ExecutionEvent::StepStarted { index, step } => {
            format!("{} [{}] {}", SPINNER, index, style(step).cyan())
        }
        ExecutionEvent::StepCompleted {
            index,
            step,
            elapsed,
        } => format!(
            "{} [{}] {} {}",
            CHECK,
            index,
            style(step).cyan(),
            style(format_duration(*elapsed)).dim()
        ),
        ExecutionEvent::StepFailed {
            index,
            step,
            reason,
            ..
        } => format!(
            "{} [{}] {}: {}",
            CROSS,
            index,
            style(step).cyan(),
            style(reason).red()
        ),
        ExecutionEvent::PipelineCompleted { summary } => format_run_summary(summary),
    }
}

/// Format a run summary for display
pub fn format_run_summary(summary: &RunSummary) -> String {
    let icon = match summary.status {
        RunStatus::Completed => CHECK,
        RunStatus::Failed => CROSS,
        RunStatus::Running => SPINNER,
    };

    let mut line = format!(
        "{} {} - {} - {} ({}/{} steps)",
        icon,
        style(&summary.run_id.to_string()[..8]).dim(),
        style(&summary.pipeline).bold(),
        format_run_status(summary.status),
        summary.steps_completed,
        summary.total_steps,
    );
    if let Some(failure) = &summary.failure {
        line.push_str(&format!(
            " - failed at step {}: {}",
            failure.stage_index,
            style(&failure.reason).red()
        ));
    }
    line
}

/// Format a record as one table row
pub fn format_record(record: &Record) -> String {
    format!(
        "{:<36}  {:<20}  {:>10.2}  {:<12}  {:>5}",
        record.id,
        truncate(&record.fields.name, 20),
        record.fields.price,
        truncate(&record.fields.category, 12),
        record.fields.stock
    )
}

/// Format the store state for display
pub fn format_request_state(state: &RequestState) -> String {
    let mut out = format!(
        "{} Status: {}  Records: {}",
        INFO,
        format_request_status(state.status),
        style(state.items.len()).cyan()
    );
    if let Some(error) = &state.error {
        out.push_str(&format!("\n{} Error: {}", WARN, style(error).red()));
    }
    if !state.items.is_empty() {
        out.push_str(&format!(
            "\n  {}",
            style(format!(
                "{:<36}  {:<20}  {:>10}  {:<12}  {:>5}",
                "ID", "NAME", "PRICE", "CATEGORY", "STOCK"
            ))
            .bold()
        ));
        for record in &state.items {
            out.push_str(&format!("\n  {}", format_record(record)));
        }
    }
    out
}

/// Format a duration compactly
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
