use super::script::{read_script, seeded_plan_store, seeded_store, Seed};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use clap::Args;
use colored::Colorize;
use furrow_common::{RemoteError, RemoteResult};
use furrow_draft::{
    BeforeUnloadHub, DraftMachine, DraftOptions, FieldErrors, LifecycleEvents, Persister,
    SaveReason,
};
use furrow_entities::{Bed, Culture, EntityKind, Field, GridEntity, Location, Task};
use furrow_grid::{Identified, MemoryStore, RowId, RowStore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct DraftArgs {
    /// JSON script of draft edits and saves
    pub script: PathBuf,

    /// Print the final state as JSON only
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftScript {
    #[serde(flatten)]
    pub seed: Seed,

    /// Seeded row to edit; a fresh entity when absent
    #[serde(default)]
    pub edit: Option<RowId>,

    #[serde(default)]
    pub events: Vec<DraftEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DraftEvent {
    Set { field: String, value: Value },
    Update { fields: Map<String, Value> },
    Save { reason: SaveReason },
    Undo,
    Redo,
    Reset,
    FailNext { message: String },
    Reject { field: String, message: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftReport {
    pub entity: EntityKind,
    pub steps: Vec<String>,
    pub draft: Value,
    pub saved: Value,
    pub dirty: bool,
    pub errors: FieldErrors,
    pub leave_blocked: bool,
}

/// Persists drafts into the in-memory store: create without an id,
/// update with one
struct StorePersister<E> {
    store: Arc<MemoryStore<E>>,
}

#[async_trait]
impl<E: GridEntity> Persister<E> for StorePersister<E> {
    async fn persist(&self, draft: E, reason: SaveReason) -> RemoteResult<E> {
        tracing::debug!(%reason, id = ?draft.id(), "persisting draft");
        match draft.id() {
            Some(id) => self.store.update(id, &draft).await,
            None => self.store.create(&draft).await,
        }
    }
}

pub async fn draft(args: DraftArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let script: DraftScript = read_script(&args.script)?;

    let report = run_script(script, &config).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for step in &report.steps {
        println!("  {} {}", "•".bright_blue(), step);
    }
    println!();
    println!("{} {}", "Draft:".bold(), report.draft);
    println!("{} {}", "Saved:".bold(), report.saved);
    println!(
        "{} {}",
        "State:".bold(),
        if report.dirty { "unsaved changes".yellow() } else { "clean".green() }
    );
    for (field, message) in &report.errors {
        println!("  {} {}: {}", "✗".red(), field, message);
    }
    if report.leave_blocked {
        println!("{}", "Closing the page now would ask for confirmation".yellow());
    }
    Ok(())
}

pub async fn run_script(script: DraftScript, config: &Config) -> Result<DraftReport> {
    let DraftScript { seed, edit, events } = script;
    match seed.entity {
        EntityKind::Location => run(seeded_store::<Location>(&seed)?, edit, &events, config).await,
        EntityKind::Field => run(seeded_store::<Field>(&seed)?, edit, &events, config).await,
        EntityKind::Bed => run(seeded_store::<Bed>(&seed)?, edit, &events, config).await,
        EntityKind::Culture => run(seeded_store::<Culture>(&seed)?, edit, &events, config).await,
        EntityKind::PlantingPlan => run(seeded_plan_store(&seed)?, edit, &events, config).await,
        EntityKind::Task => run(seeded_store::<Task>(&seed)?, edit, &events, config).await,
    }
}

async fn run<E: GridEntity>(
    store: MemoryStore<E>,
    edit: Option<RowId>,
    events: &[DraftEvent],
    config: &Config,
) -> Result<DraftReport> {
    let initial = match edit {
        Some(id) => store
            .rows()
            .into_iter()
            .find(|row| row.id() == Some(id))
            .ok_or_else(|| anyhow!("no seeded {} with id {}", E::KIND, id))?,
        None => E::default(),
    };

    let store = Arc::new(store);
    let hub = Arc::new(BeforeUnloadHub::new());
    let options = DraftOptions::new(config.autosave.clone())
        .unload_events(hub.clone() as Arc<dyn LifecycleEvents>)
        .unload_message(config.grid.messages.unsaved_changes.clone());

    let machine = DraftMachine::new(
        initial,
        E::validate,
        Arc::new(StorePersister { store: store.clone() }),
        options,
    );

    let mut steps = Vec::with_capacity(events.len());
    for event in events {
        let step = match event {
            DraftEvent::Set { field, value } => match machine.set_field(field, value.clone()) {
                Ok(()) => format!("set {} = {}", field, value),
                Err(error) => format!("set {} failed: {}", field, error),
            },
            DraftEvent::Update { fields } => {
                let keys = fields.keys().cloned().collect::<Vec<_>>().join(", ");
                match machine.update_fields(fields.clone()) {
                    Ok(()) => format!("update {}", keys),
                    Err(error) => format!("update {} failed: {}", keys, error),
                }
            }
            DraftEvent::Save { reason } => {
                let saved = machine.save_if_valid(*reason).await;
                format!("save ({}) → {}", reason, if saved { "saved" } else { "not saved" })
            }
            DraftEvent::Undo => {
                let undone = machine.undo().context("undo")?;
                format!("undo → {}", if undone { "reverted" } else { "nothing to undo" })
            }
            DraftEvent::Redo => {
                let redone = machine.redo().context("redo")?;
                format!("redo → {}", if redone { "reapplied" } else { "nothing to redo" })
            }
            DraftEvent::Reset => {
                machine.reset_to_saved();
                "reset to saved".to_string()
            }
            DraftEvent::FailNext { message } => {
                store.fail_next(RemoteError::Transport(message.clone()));
                "next save will fail".to_string()
            }
            DraftEvent::Reject { field, message } => {
                store.fail_next(RemoteError::rejected(field.as_str(), message.as_str()));
                format!("next save rejects {}", field)
            }
        };
        steps.push(step);
    }

    let leave_blocked = hub.dispatch().default_prevented();
    let report = DraftReport {
        entity: E::KIND,
        steps,
        draft: serde_json::to_value(machine.draft())?,
        saved: serde_json::to_value(machine.saved())?,
        dirty: machine.is_dirty(),
        errors: machine.visible_errors(),
        leave_blocked,
    };
    machine.teardown();
    Ok(report)
}
