use stagecraft::cli::commands::{CatalogCommand, RunCommand, ValidateCommand};
use stagecraft::cli::output::*;
use stagecraft::cli::{Cli, Command};
use stagecraft::core::config::WorkflowConfig;
use stagecraft::core::{PipelineResult, RunSummary};
use stagecraft::execution::{ExecutionEngine, ExecutionEvent};
use stagecraft::gateway::{GatewayConfig, InMemoryGateway};
use stagecraft::store::{RecordFields, RecordPatch, RecordStore, RequestStatus};

use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_workflow(cmd).await?,
        Command::Validate(cmd) => validate_workflow(cmd)?,
        Command::Catalog(cmd) => run_catalog(cmd).await?,
    }

    Ok(())
}

async fn run_workflow(cmd: &RunCommand) -> Result<()> {
    let mut config = WorkflowConfig::from_file(&cmd.file)
        .context("Failed to load workflow config")?;

    println!("{} Loaded workflow: {}", INFO, style(&config.name).bold());

    for (key, value) in &cmd.variable {
        config.set_variable(key.clone(), value.clone());
        println!(
            "{} Variable override: {} = {}",
            INFO,
            style(key).cyan(),
            style(value).dim()
        );
    }

    let input = match &cmd.input {
        Some(raw) => serde_json::from_str(raw).context("Failed to parse --input as JSON")?,
        None => config.input.clone(),
    };

    let pipeline = config.to_pipeline();
    let progress = create_progress_bar(pipeline.len());
    let summary = Arc::new(Mutex::new(None::<RunSummary>));

    let bar = progress.clone();
    let last_summary = summary.clone();
    let engine = ExecutionEngine::new().with_event_handler(move |event| {
        bar.println(format_execution_event(event));
        match event {
            ExecutionEvent::StepStarted { step, .. } => bar.set_message(step.clone()),
            ExecutionEvent::StepCompleted { .. } => bar.inc(1),
            ExecutionEvent::PipelineCompleted { summary } => {
                if let Ok(mut slot) = last_summary.lock() {
                    *slot = Some(summary.clone());
                }
            }
            _ => {}
        }
    });

    println!();
    let result = engine.execute(&pipeline, input).await;
    progress.finish_and_clear();

    if cmd.json {
        if let Ok(slot) = summary.lock() {
            if let Some(summary) = slot.as_ref() {
                println!("{}", serde_json::to_string_pretty(summary)?);
            }
        }
    }

    match result {
        PipelineResult::Success(value) => {
            println!(
                "\n{} {} completed {}",
                CHECK,
                style(&pipeline.name).bold(),
                style("successfully").green()
            );
            println!("  Result: {}", serde_json::to_string_pretty(&value)?);
        }
        PipelineResult::Failure(failure) => {
            println!(
                "\n{} {} {} at step {} ({})",
                CROSS,
                style(&pipeline.name).bold(),
                style("failed").red(),
                failure.stage_index,
                style(&failure.step).cyan()
            );
            error!("{}", failure);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn validate_workflow(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating workflow...", INFO);

    match WorkflowConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Workflow configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Steps: {}", style(config.steps.len()).cyan());
            println!("  Variables: {}", style(config.variables.len()).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

async fn run_catalog(cmd: &CatalogCommand) -> Result<()> {
    let gateway_config = GatewayConfig::new()
        .with_latency(cmd.latency_ms)
        .with_failure_rate(cmd.failure_rate);

    let gateway = match &cmd.seed {
        Some(path) => InMemoryGateway::from_seed_file(path, gateway_config)?,
        None => InMemoryGateway::with_config(gateway_config),
    };
    let store = RecordStore::new(Arc::new(gateway));

    // Parse everything up front so bad input fails before any call is made
    let candidates = cmd
        .add
        .iter()
        .map(|raw| {
            serde_json::from_str::<RecordFields>(raw)
                .with_context(|| format!("Invalid record for --add: {}", raw))
        })
        .collect::<Result<Vec<_>>>()?;
    let patches = cmd
        .update
        .iter()
        .map(|(id, raw)| {
            serde_json::from_str::<RecordPatch>(raw)
                .map(|patch| (id.clone(), patch))
                .with_context(|| format!("Invalid patch for --update {}: {}", id, raw))
        })
        .collect::<Result<Vec<_>>>()?;

    let status = store.fetch_all().await;
    if status == RequestStatus::Failed {
        println!("{} Fetch failed; continuing with current records", WARN);
    }

    for candidate in candidates {
        match store.add(candidate).await {
            Ok(record) => println!("{} Added {}", CHECK, style(&record.id).cyan()),
            Err(e) => println!("{} Add failed: {}", CROSS, style(e).red()),
        }
    }

    for (id, patch) in patches {
        match store.update(&id, patch).await {
            Ok(record) => println!("{} Updated {}", CHECK, style(&record.id).cyan()),
            Err(e) => println!("{} Update of {} failed: {}", CROSS, id, style(e).red()),
        }
    }

    let state = store.snapshot();
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        println!("\n{}", format_request_state(&state));
    }

    Ok(())
}
