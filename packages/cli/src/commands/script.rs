//! Script files shared by the `replay` and `draft` commands

use anyhow::{Context, Result};
use furrow_entities::{Culture, EntityKind, GridEntity, PlantingPlan};
use furrow_grid::MemoryStore;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Seed data for the in-memory store
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    /// Which collection the script edits
    pub entity: EntityKind,

    /// Rows the store starts with; each needs an `id`
    #[serde(default)]
    pub rows: Vec<Value>,

    /// Cultures used to derive planting plan harvest dates
    #[serde(default)]
    pub cultures: Vec<Culture>,
}

pub fn read_script<S: DeserializeOwned>(path: &Path) -> Result<S> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read script {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid script {}", path.display()))
}

/// Parse seed rows into the entity type
pub fn seed_rows<E: GridEntity>(seed: &Seed) -> Result<Vec<E>> {
    seed.rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value(row.clone())
                .with_context(|| format!("Seed row {} is not a valid {}", index, E::KIND))
        })
        .collect()
}

/// A store that derives fields the way the server does
pub fn seeded_store<E: GridEntity>(seed: &Seed) -> Result<MemoryStore<E>> {
    Ok(MemoryStore::with_rows(seed_rows(seed)?).with_canonicalizer(E::canonicalize))
}

/// Planting plans also need the culture catalogue to fill harvest dates
pub fn seeded_plan_store(seed: &Seed) -> Result<MemoryStore<PlantingPlan>> {
    let cultures = seed.cultures.clone();
    Ok(MemoryStore::with_rows(seed_rows(seed)?).with_canonicalizer(move |plan: &mut PlantingPlan| {
        let culture = cultures
            .iter()
            .find(|culture| culture.id.is_some() && culture.id == plan.culture_id);
        if let Some(culture) = culture {
            plan.derive_dates(culture);
        }
    }))
}
