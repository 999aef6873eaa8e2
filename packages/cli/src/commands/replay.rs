use super::script::{read_script, seeded_plan_store, seeded_store, Seed};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use furrow_common::RemoteError;
use furrow_entities::{Bed, Culture, EntityKind, Field, GridEntity, Location, Task};
use furrow_grid::{
    CommitOutcome, DeleteOutcome, GridController, MemoryStore, RowId, StopReason, StoreCall,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON script of grid events
    pub script: PathBuf,

    /// Answer "no" to every confirmation prompt
    #[arg(long)]
    pub decline: bool,

    /// Print the final state as JSON only
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayScript {
    #[serde(flatten)]
    pub seed: Seed,

    #[serde(default)]
    pub events: Vec<GridEvent>,
}

/// One interaction. A missing `row` means the most recently added row.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GridEvent {
    Add,
    Click { row: Option<RowId>, field: String },
    Edit { row: Option<RowId>, field: String, value: Value },
    Blur { row: Option<RowId> },
    Tab { row: Option<RowId> },
    Enter { row: Option<RowId> },
    Escape { row: Option<RowId> },
    Delete { row: Option<RowId> },
    Select { rows: Vec<RowId> },

    /// Next store call fails without field detail
    FailNext { message: String },

    /// Next store call rejects one field
    Reject { field: String, message: String },
}

impl GridEvent {
    fn stop_reason(&self) -> StopReason {
        match self {
            GridEvent::Tab { .. } => StopReason::Tab,
            GridEvent::Enter { .. } => StopReason::Enter,
            GridEvent::Escape { .. } => StopReason::Escape,
            _ => StopReason::Blur,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub entity: EntityKind,
    pub steps: Vec<String>,
    pub rows: Vec<Value>,
    pub editing: Vec<RowId>,
    pub error: Option<String>,
    pub calls: Vec<String>,
}

pub async fn replay(args: ReplayArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let script: ReplayScript = read_script(&args.script)?;

    if !args.json {
        println!(
            "▶ {} {} ({} events)",
            "Replaying".green().bold(),
            args.script.display(),
            script.events.len()
        );
        println!();
    }

    let report = run_script(script, &config, !args.decline).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Drive a grid for the script's entity over an in-memory store
pub async fn run_script(script: ReplayScript, config: &Config, confirm: bool) -> Result<ReplayReport> {
    let ReplayScript { seed, events } = script;
    match seed.entity {
        EntityKind::Location => run(seeded_store::<Location>(&seed)?, &events, config, confirm).await,
        EntityKind::Field => run(seeded_store::<Field>(&seed)?, &events, config, confirm).await,
        EntityKind::Bed => run(seeded_store::<Bed>(&seed)?, &events, config, confirm).await,
        EntityKind::Culture => run(seeded_store::<Culture>(&seed)?, &events, config, confirm).await,
        EntityKind::PlantingPlan => run(seeded_plan_store(&seed)?, &events, config, confirm).await,
        EntityKind::Task => run(seeded_store::<Task>(&seed)?, &events, config, confirm).await,
    }
}

async fn run<E: GridEntity>(
    store: MemoryStore<E>,
    events: &[GridEvent],
    config: &Config,
    confirm: bool,
) -> Result<ReplayReport> {
    let store = Arc::new(store);
    let mut grid_config = config.grid.clone();
    if grid_config.columns.is_empty() {
        grid_config.columns = E::columns();
    }

    let mut grid = GridController::new(
        store.clone(),
        E::validate,
        move |message: &str| {
            tracing::info!(message, answer = confirm, "confirmation requested");
            confirm
        },
        grid_config,
    );
    grid.load().await?;

    let mut latest: Option<RowId> = None;
    let mut steps = Vec::with_capacity(events.len());

    for event in events {
        let step = match event {
            GridEvent::Add => {
                let id = grid.add_row();
                latest = Some(id);
                "add → new row".to_string()
            }
            GridEvent::Click { row, field } => {
                let id = resolve(*row, latest)?;
                let entered = grid.cell_click(id, field);
                format!("click {}.{} → {}", label(id), field, if entered { "edit" } else { "ignored" })
            }
            GridEvent::Edit { row, field, value } => {
                let id = resolve(*row, latest)?;
                match grid.edit_cell(id, field, value.clone()) {
                    Ok(()) => format!("edit {}.{} = {}", label(id), field, value),
                    Err(error) => format!("edit {}.{} failed: {}", label(id), field, error),
                }
            }
            GridEvent::Blur { row }
            | GridEvent::Tab { row }
            | GridEvent::Enter { row }
            | GridEvent::Escape { row } => {
                let id = resolve(*row, latest)?;
                stop(&mut grid, id, event.stop_reason(), &mut latest).await
            }
            GridEvent::Delete { row } => {
                let id = resolve(*row, latest)?;
                match grid.delete_row(id).await {
                    Ok(DeleteOutcome::Deleted) => format!("delete {} → deleted", label(id)),
                    Ok(DeleteOutcome::Declined) => format!("delete {} → declined", label(id)),
                    Ok(DeleteOutcome::Failed) => format!("delete {} → failed", label(id)),
                    Err(error) => format!("delete {} failed: {}", label(id), error),
                }
            }
            GridEvent::Select { rows } => {
                grid.select(rows);
                format!("select {:?}", grid.selection())
            }
            GridEvent::FailNext { message } => {
                store.fail_next(RemoteError::Transport(message.clone()));
                "next store call will fail".to_string()
            }
            GridEvent::Reject { field, message } => {
                store.fail_next(RemoteError::rejected(field.as_str(), message.as_str()));
                format!("next store call rejects {}", field)
            }
        };
        steps.push(step);
    }

    let rows = grid
        .rows()
        .iter()
        .map(|row| serde_json::to_value(&row.values))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReplayReport {
        entity: E::KIND,
        steps,
        rows,
        editing: grid.modes().editing_rows(),
        error: grid.error().map(str::to_string),
        calls: store.calls().iter().map(describe_call).collect(),
    })
}

async fn stop<E: GridEntity>(
    grid: &mut GridController<E>,
    id: RowId,
    reason: StopReason,
    latest: &mut Option<RowId>,
) -> String {
    let verb = format!("{:?}", reason).to_lowercase();
    match grid.stop_edit(id, reason).await {
        Ok(CommitOutcome::Saved { id: saved }) => {
            if *latest == Some(id) {
                *latest = Some(saved);
            }
            format!("{} {} → saved as {}", verb, label(id), saved)
        }
        Ok(CommitOutcome::Cancelled) => format!("{} {} → reverted", verb, label(id)),
        Ok(CommitOutcome::Unchanged) => format!("{} {} → unchanged", verb, label(id)),
        Ok(CommitOutcome::Invalid { editing }) => format!(
            "{} {} → invalid, {}",
            verb,
            label(id),
            if editing { "still editing" } else { "back to view" }
        ),
        Ok(CommitOutcome::Failed) => format!("{} {} → store refused", verb, label(id)),
        Err(error) => format!("{} {} failed: {}", verb, label(id), error),
    }
}

fn resolve(row: Option<RowId>, latest: Option<RowId>) -> Result<RowId> {
    row.or(latest)
        .ok_or_else(|| anyhow!("event names no row and no row was added before it"))
}

fn label(id: RowId) -> String {
    if id < 0 {
        "new row".to_string()
    } else {
        format!("#{}", id)
    }
}

fn describe_call(call: &StoreCall) -> String {
    match call {
        StoreCall::List => "list".to_string(),
        StoreCall::Create => "create".to_string(),
        StoreCall::Update(id) => format!("update {}", id),
        StoreCall::Delete(id) => format!("delete {}", id),
    }
}

fn print_report(report: &ReplayReport) {
    for step in &report.steps {
        println!("  {} {}", "•".bright_blue(), step);
    }

    println!();
    println!("{} ({})", "Rows".bold(), report.entity);
    for row in &report.rows {
        println!("  {}", row);
    }
    if !report.editing.is_empty() {
        println!("  {} {:?}", "Editing:".yellow(), report.editing);
    }

    println!();
    println!("{} {}", "Store calls:".bold(), report.calls.join(", "));

    if let Some(error) = &report.error {
        println!();
        println!("{}", "Error".red().bold());
        for line in error.lines() {
            println!("  {}", line.red());
        }
    }
}
