//! Entities driven through drafts and grids

use async_trait::async_trait;
use chrono::NaiveDate;
use furrow_draft::{DraftMachine, DraftOptions, Persister, RemoteResult, SaveReason};
use furrow_entities::{Bed, Culture, GridEntity, PlantingPlan};
use furrow_grid::{CommitOutcome, GridConfig, GridController, MemoryStore, StopReason};
use serde_json::json;
use std::sync::Arc;

fn carrots() -> Culture {
    Culture {
        id: Some(1),
        name: "Carrot".to_string(),
        days_to_maturity: 70,
        harvest_window_days: 21,
        ..Culture::default()
    }
}

#[tokio::test]
async fn test_plan_grid_receives_derived_harvest_window() {
    let culture = carrots();
    let store = Arc::new(
        MemoryStore::<PlantingPlan>::new().with_canonicalizer(move |plan| plan.derive_dates(&culture)),
    );
    let mut grid = GridController::new(
        store,
        PlantingPlan::validate,
        |_: &str| true,
        GridConfig::with_columns(PlantingPlan::columns()),
    );
    grid.load().await.unwrap();

    let id = grid.add_row();
    grid.edit_cell(id, "cultureId", json!(1)).unwrap();
    grid.edit_cell(id, "bedId", json!(4)).unwrap();
    grid.edit_cell(id, "plantingDate", json!("2024-04-01")).unwrap();

    let outcome = grid.stop_edit(id, StopReason::Enter).await.unwrap();
    assert_eq!(outcome, CommitOutcome::Saved { id: 1 });

    let plan = &grid.rows()[0].values;
    assert_eq!(plan.harvest_start, NaiveDate::from_ymd_opt(2024, 6, 10));
    assert_eq!(plan.harvest_end, NaiveDate::from_ymd_opt(2024, 7, 1));
}

#[tokio::test]
async fn test_plan_edit_with_bad_date_is_rejected() {
    let mut grid = GridController::new(
        Arc::new(MemoryStore::<PlantingPlan>::new()),
        PlantingPlan::validate,
        |_: &str| true,
        GridConfig::default(),
    );
    let id = grid.add_row();

    assert!(grid.edit_cell(id, "plantingDate", json!("first of April")).is_err());
    assert_eq!(grid.row(id).unwrap().values.planting_date, None);
}

/// Stores beds the way the server would: derived area, fixed id
struct BedEndpoint;

#[async_trait]
impl Persister<Bed> for BedEndpoint {
    async fn persist(&self, mut bed: Bed, _reason: SaveReason) -> RemoteResult<Bed> {
        bed.id = Some(7);
        bed.canonicalize();
        Ok(bed)
    }
}

#[tokio::test]
async fn test_bed_draft_saves_canonical_area() {
    let machine = DraftMachine::new(
        Bed::default(),
        Bed::validate,
        Arc::new(BedEndpoint),
        DraftOptions::default(),
    );

    machine.set_field("name", json!("B2")).unwrap();
    machine.set_field("fieldId", json!(3)).unwrap();
    machine.set_field("lengthM", json!(12.0)).unwrap();
    assert!(!machine.save_if_valid(SaveReason::Blur).await);
    assert!(machine.errors_visible());

    machine.set_field("widthM", json!(0.5)).unwrap();
    assert!(machine.save_if_valid(SaveReason::Manual).await);

    let saved = machine.saved();
    assert_eq!(saved.id, Some(7));
    assert_eq!(saved.area_m2, 6.0);
    assert!(!machine.is_dirty());
}
